mod share_link_service;

pub use share_link_service::ShareLinkService;
