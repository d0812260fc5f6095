/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE & ACCOUNT STATUS CONSTANTS
// =============================================================================

/// Regular user - manages and shares their own documents
pub const ROLE_USER: i16 = 0;

/// Admin - manages users, services and reads statistics
pub const ROLE_ADMIN: i16 = 1;

pub const STATUS_ACTIVE: &str = "actif";
pub const STATUS_INACTIVE: &str = "inactif";
pub const STATUS_SUSPENDED: &str = "suspendu";

// =============================================================================
// DOCUMENTS & SHARING
// =============================================================================

/// Maximum uploaded document size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Storage prefix for document files
pub const DOCUMENTS_PREFIX: &str = "documents";

/// Length of generated share link tokens
pub const SHARE_LINK_TOKEN_LENGTH: usize = 32;

/// Length of share link access codes
pub const ACCESS_CODE_LENGTH: usize = 6;

/// Wrong access codes tolerated before a share link is locked
pub const SHARE_LINK_MAX_CODE_ATTEMPTS: i32 = 5;

/// How long a share link stays locked after too many wrong codes
pub const SHARE_LINK_LOCK_MINUTES: i64 = 15;

/// Notification type emitted when a document is shared
pub const NOTIFICATION_DOCUMENT_SHARED: &str = "document_shared";

/// Notifications listed per page
pub const NOTIFICATIONS_PAGE_SIZE: i64 = 15;

/// Default page size of the advanced document search
pub const SEARCH_DEFAULT_PER_PAGE: i64 = 15;

/// Default number of entries in the recent documents feed
pub const RECENT_DEFAULT_LIMIT: i64 = 10;

/// Length of passwords generated at registration
pub const GENERATED_PASSWORD_LENGTH: usize = 8;
