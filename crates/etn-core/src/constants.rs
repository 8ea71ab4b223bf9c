//! Shared constants

/// Owner id stamped on documents created without a signed-in session.
pub const ANONYMOUS_OWNER_ID: &str = "anonymous";

/// Query parameter carrying the document id in a shareable link.
pub const VIEW_QUERY_PARAM: &str = "view";

/// Base URL shareable links are generated for.
pub const DEFAULT_SHARE_BASE_URL: &str = "https://etn.lol/";

/// Application namespace used in the collection path.
pub const DEFAULT_APP_ID: &str = "etn-profile-dev";

/// Project id shipped in the sample Firebase config; never a real project.
pub const PLACEHOLDER_FIREBASE_PROJECT_ID: &str = "YOUR_FIREBASE_PROJECT_ID";

pub const DEFAULT_MAX_UPLOAD_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;

/// Maximum length of a store error echoed back in a failure status.
pub const STATUS_REASON_MAX_LEN: usize = 80;

/// Collection holding shared images for an application id.
pub fn shared_images_collection(app_id: &str) -> String {
    format!("artifacts/{}/public/data/shared_images", app_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_path_is_namespaced_by_app_id() {
        assert_eq!(
            shared_images_collection(DEFAULT_APP_ID),
            "artifacts/etn-profile-dev/public/data/shared_images"
        );
    }
}
