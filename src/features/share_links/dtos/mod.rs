mod share_link_dto;

pub use share_link_dto::{
    AccessCodeQuery, CreateShareLinkDto, ShareLinkCreatedDto, ShareLinkDto,
    SharedDocumentInfoDto, SharedDocumentSummaryDto,
};
