mod generate;
mod info;
mod plan;

pub use generate::cmd_generate;
pub use info::cmd_info;
pub use plan::cmd_plan;
