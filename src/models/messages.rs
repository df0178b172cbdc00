//! User-facing message fragments shared by repositories, services and handlers.

pub const WITH_ID: &str = "with ID";

pub mod car {
    pub const CREATE_SUCCESS: &str = "Car created successfully";
    pub const CREATE_ERROR: &str = "Error creating car";
    pub const FIND_SUCCESS: &str = "Found cars";
    pub const FIND_ERROR: &str = "Error finding cars";
    pub const NOT_FOUND: &str = "Car not found";
    pub const UPDATE_SUCCESS: &str = "Car updated successfully";
    pub const UPDATE_ERROR: &str = "Error updating car";
    pub const DELETE_SUCCESS: &str = "Car deleted successfully";
    pub const DELETE_ERROR: &str = "Error deleting car";
}

pub mod picture {
    pub const CREATE_SUCCESS: &str = "Picture created successfully";
    pub const CREATE_ERROR: &str = "Error creating picture";
    pub const FIND_SUCCESS: &str = "Found pictures";
    pub const FIND_ERROR: &str = "Error finding pictures";
    pub const NOT_FOUND: &str = "Picture not found";
    pub const UPDATE_SUCCESS: &str = "Picture updated successfully";
    pub const UPDATE_ERROR: &str = "Error updating picture";
    pub const DELETE_SUCCESS: &str = "Picture deleted successfully";
    pub const DELETE_ERROR: &str = "Error deleting picture";
    pub const URL_SUCCESS: &str = "Image URL generated successfully";

    pub const BAD_REQUEST: &str = "Bad request, check files and documentation";
    pub const FILES_REQUIRED_FOR_DOCUMENTATION: &str =
        "File is required for the following documentation pictures";
    pub const DOCUMENTATION_REQUIRED_FOR_FILES: &str = "Documentation is required for the following files";
}

pub mod upload {
    pub const INVALID_FILE_TYPE: &str = "Invalid file type";
    pub const INVALID_FIELD_NAME: &str = "Invalid field name";
    pub const VALID_FILE_TYPES: &str = "valid file types are";
    pub const VALID_FIELD_NAMES: &str = "valid field names are";
    pub const NO_MIME_TYPE: &str = "No mime type found";
    pub const DUPLICATE_CATEGORY: &str = "Only one file is allowed per category";
    pub const INVALID_FORM: &str = "Invalid form data";
}

pub mod storage {
    pub const UPLOAD_ERROR: &str = "Error uploading image";
    pub const DELETE_ERROR: &str = "Error deleting image";
    pub const DELETE_ALL_ERROR: &str = "Error deleting images";
    pub const URL_ERROR: &str = "Error generating image URL";
    pub const BUCKET_CHECK_ERROR: &str = "Error checking bucket";
    pub const BUCKET_CREATE_ERROR: &str = "Error creating bucket";
}

/// `"<subject> with ID <id>"`
pub fn with_id(subject: &str, id: i32) -> String {
    format!("{} {} {}", subject, WITH_ID, id)
}

/// `"<subject> (<count> found)"`
pub fn found(subject: &str, count: usize) -> String {
    format!("{} ({} found)", subject, count)
}
