mod statistics_dto;

pub use statistics_dto::*;
