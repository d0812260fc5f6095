mod org_service;

pub use org_service::OrgService;
