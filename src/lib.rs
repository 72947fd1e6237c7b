// Library for tests to access modules

pub mod config;
pub mod docker_repo;
pub mod models;
pub mod routes;
pub mod sampler;
pub mod sysinfo_repo;
pub mod version;
pub mod worker;
