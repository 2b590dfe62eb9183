pub mod broker;
pub mod cat;
pub mod grant;
pub mod health;
pub mod init;
pub mod restore;
pub mod upload;
pub mod version;
pub mod versions;

pub use broker::Broker;
pub use cat::Cat;
pub use grant::Grant;
pub use health::Health;
pub use init::Init;
pub use restore::Restore;
pub use upload::Upload;
pub use version::Version;
pub use versions::Versions;
