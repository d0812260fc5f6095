mod notification_dto;

pub use notification_dto::{
    MarkAllReadResponseDto, NotificationQuery, NotificationResponseDto, NotificationStatus,
    UnreadCountDto,
};
