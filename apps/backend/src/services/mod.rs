pub mod match_flow;
pub mod task_pool;
