pub mod device_collaborator;
pub mod session_delegate;
