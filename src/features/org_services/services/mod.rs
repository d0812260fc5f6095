mod org_service_service;

pub use org_service_service::OrgServiceService;
