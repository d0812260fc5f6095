//! File type classification used by search filters, storage statistics and uploads.

/// Display categories offered by the search filter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeCategory {
    Pdf,
    Word,
    Excel,
    PowerPoint,
    Image,
    Video,
    Audio,
    Texte,
    Archive,
    Autre,
}

impl TypeCategory {
    pub fn label(self) -> &'static str {
        match self {
            TypeCategory::Pdf => "PDF",
            TypeCategory::Word => "Word",
            TypeCategory::Excel => "Excel",
            TypeCategory::PowerPoint => "PowerPoint",
            TypeCategory::Image => "Image",
            TypeCategory::Video => "Vidéo",
            TypeCategory::Audio => "Audio",
            TypeCategory::Texte => "Texte",
            TypeCategory::Archive => "Archive",
            TypeCategory::Autre => "Autre",
        }
    }
}

/// Storage buckets reported by the storage breakdown statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCategory {
    Images,
    Videos,
    Audio,
    Documents,
    Archives,
    Autres,
}

const WORD_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
];

const EXCEL_TYPES: &[&str] = &[
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.spreadsheet",
    "text/csv",
];

const POWERPOINT_TYPES: &[&str] = &[
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.oasis.opendocument.presentation",
];

const ARCHIVE_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/x-tar",
    "application/gzip",
];

/// Office-style types counted as "documents" by the storage breakdown
const STORAGE_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/vnd.ms-excel",
];

pub fn categorize(mime: &str) -> TypeCategory {
    let mime = normalize(mime);
    let mime = mime.as_str();
    if mime == "application/pdf" {
        TypeCategory::Pdf
    } else if WORD_TYPES.contains(&mime) {
        TypeCategory::Word
    } else if EXCEL_TYPES.contains(&mime) {
        TypeCategory::Excel
    } else if POWERPOINT_TYPES.contains(&mime) {
        TypeCategory::PowerPoint
    } else if mime.starts_with("image/") {
        TypeCategory::Image
    } else if mime.starts_with("video/") {
        TypeCategory::Video
    } else if mime.starts_with("audio/") {
        TypeCategory::Audio
    } else if mime.starts_with("text/") {
        TypeCategory::Texte
    } else if ARCHIVE_TYPES.contains(&mime) {
        TypeCategory::Archive
    } else {
        TypeCategory::Autre
    }
}

pub fn storage_category(mime: &str) -> StorageCategory {
    let mime = normalize(mime);
    let mime = mime.as_str();
    if mime.starts_with("image/") {
        StorageCategory::Images
    } else if mime.starts_with("video/") {
        StorageCategory::Videos
    } else if mime.starts_with("audio/") {
        StorageCategory::Audio
    } else if STORAGE_DOCUMENT_TYPES.contains(&mime) {
        StorageCategory::Documents
    } else if ARCHIVE_TYPES.contains(&mime) {
        StorageCategory::Archives
    } else {
        StorageCategory::Autres
    }
}

/// Mime type for a bare extension filter such as `pdf` or `.docx`
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "odt" => "application/vnd.oasis.opendocument.text",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "7z" => "application/x-7z-compressed",
        _ => return None,
    };
    Some(mime)
}

/// Lower-cased file extension of a client filename, if any
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn normalize(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("application/pdf"), TypeCategory::Pdf);
        assert_eq!(
            categorize("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            TypeCategory::Word
        );
        assert_eq!(categorize("text/csv"), TypeCategory::Excel);
        assert_eq!(categorize("image/PNG"), TypeCategory::Image);
        assert_eq!(categorize("text/plain; charset=utf-8"), TypeCategory::Texte);
        assert_eq!(categorize("application/zip"), TypeCategory::Archive);
        assert_eq!(categorize("application/octet-stream"), TypeCategory::Autre);
        assert_eq!(TypeCategory::Video.label(), "Vidéo");
    }

    #[test]
    fn test_storage_category() {
        assert_eq!(storage_category("image/jpeg"), StorageCategory::Images);
        assert_eq!(storage_category("video/mp4"), StorageCategory::Videos);
        assert_eq!(storage_category("audio/mpeg"), StorageCategory::Audio);
        assert_eq!(storage_category("application/pdf"), StorageCategory::Documents);
        assert_eq!(storage_category("application/x-7z-compressed"), StorageCategory::Archives);
        // PowerPoint is not counted as a document in the breakdown
        assert_eq!(
            storage_category("application/vnd.ms-powerpoint"),
            StorageCategory::Autres
        );
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(extension_of("Rapport Final.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".env"), None);
        assert_eq!(extension_of("x.ph p"), None);
        assert_eq!(mime_for_extension(".DOCX"), Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"));
        assert_eq!(mime_for_extension("exe"), None);
    }
}
