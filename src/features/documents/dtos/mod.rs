mod document_dto;

pub use document_dto::{
    DocumentResponseDto, RecentDocumentDto, RecentQuery, RecentSource, SendDocumentEmailDto,
    TrashQuery, TrashResponseDto, UpdateDocumentDto, UploadDocumentForm,
};
