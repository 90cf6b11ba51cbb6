mod pipeline;
mod plan;
