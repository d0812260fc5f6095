mod org_service_dto;

pub use org_service_dto::{
    CreateOrgServiceDto, DestroyGroupDto, DestroyGroupResponseDto, OrgServiceResponseDto,
    UpdateOrgServiceDto,
};
