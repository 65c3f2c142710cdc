pub mod position;
pub mod task;
pub mod task_type;
pub mod worker;

pub use position::Position;
pub use task::{NewTask, Priority, Task};
pub use task_type::TaskType;
pub use worker::{NewWorker, Worker, WorkerProfile, WorkerUpdate};
