pub mod mock_gateway;
pub mod submit_client;

pub use mock_gateway::MockSubmitGateway;
pub use submit_client::HttpSubmitGateway;
