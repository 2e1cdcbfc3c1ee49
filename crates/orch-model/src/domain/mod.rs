mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod error;
pub use error::ModelError;

mod service_id;
pub use service_id::ServiceId;

mod service_info;
pub use service_info::ServiceExecutionInfo;

mod execution_status;
pub use execution_status::ExecutionStatus;

mod container_handle;
pub use container_handle::ContainerHandle;

mod wait;
pub use wait::WaitCondition;
