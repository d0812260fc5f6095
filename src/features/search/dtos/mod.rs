mod search_dto;

pub use search_dto::{
    DocumentSearchQuery, FilterOptionsDto, PersonOptionDto, ServiceOptionDto, TypeOptionDto,
    SEARCH_SORT_COLUMNS,
};
