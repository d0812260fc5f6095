mod share_dto;

pub use share_dto::{
    ShareByServiceDto, ShareByServiceSummaryDto, ShareDocumentDto, ShareResponseDto,
    ShareUserDto, SharedWithMeDto, SharedWithMeQuery,
};
