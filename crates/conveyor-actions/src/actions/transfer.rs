//! Actions that copy files to servers and object stores.

pipeline_action! {
    /// Uploads files over SFTP.
    Sftp {
        args: SftpArgs,
        state: SftpState,
        props: SftpProps,
        type_token: "conveyor:pipeline/sftp:Sftp",
        kind: "SFTP",
        replace_on_change: false,
        required {
            host: String,
            port: String,
            /// `PASS`, `PRIVATE_KEY`, `PRIVATE_KEY_AND_PASS` or `ENV_KEY`.
            authentication_mode: String,
            /// Directory on the server to upload into.
            remote_path: String,
        }
        optional {
            login: String,
            /// Required when `authentication_mode` is `PASS`.
            password: String,
            /// Required when `authentication_mode` is `PRIVATE_KEY`.
            key: String,
            passphrase: String,
            /// Local directory to upload; defaults to the repository root.
            local_path: String,
            /// Paths left out of the upload.
            deployment_excludes: Vec<String>,
            /// Keep remote files that were deleted from the repository.
            deletion_disabled: bool,
        }
    }
}

pipeline_action! {
    /// Synchronizes files with rsync over SSH.
    Rsync {
        args: RsyncArgs,
        state: RsyncState,
        props: RsyncProps,
        type_token: "conveyor:pipeline/rsync:Rsync",
        kind: "RSYNC",
        replace_on_change: false,
        required {
            host: String,
            port: String,
            authentication_mode: String,
            remote_path: String,
        }
        optional {
            login: String,
            password: String,
            key: String,
            passphrase: String,
            local_path: String,
            /// Extra rsync flags, e.g. `--delete`.
            custom_flags: String,
            /// Archive mode (`-a`).
            archive: bool,
            /// Compress during transfer (`-z`).
            compress: bool,
            deployment_excludes: Vec<String>,
        }
    }
}

pipeline_action! {
    /// Uploads files to an Amazon S3 bucket.
    AmazonS3 {
        args: AmazonS3Args,
        state: AmazonS3State,
        props: AmazonS3Props,
        type_token: "conveyor:pipeline/amazonS3:AmazonS3",
        kind: "AMAZON_S3",
        replace_on_change: false,
        required {
            bucket_name: String,
            region: String,
            /// AWS integration. A full integration object is sent as its hash id.
            integration: crate::types::IntegrationSource,
        }
        optional {
            local_path: String,
            remote_path: String,
            /// Canned ACL, e.g. `PRIVATE` or `PUBLIC_READ`.
            acl: String,
            /// `Cache-Control` header for uploaded objects.
            cache_control: String,
            /// Keep objects that were deleted from the repository.
            deletion_disabled: bool,
            deployment_excludes: Vec<String>,
        }
    }
}

pipeline_action! {
    /// Uploads files to a Google Cloud Storage bucket.
    GoogleCloudStorage {
        args: GoogleCloudStorageArgs,
        state: GoogleCloudStorageState,
        props: GoogleCloudStorageProps,
        type_token: "conveyor:pipeline/googleCloudStorage:GoogleCloudStorage",
        kind: "GCS",
        replace_on_change: false,
        required {
            bucket_name: String,
            /// Google service account integration.
            integration: crate::types::IntegrationSource,
        }
        optional {
            local_path: String,
            remote_path: String,
            /// Predefined ACL, e.g. `PROJECT_PRIVATE`.
            acl: String,
            cache_control: String,
            deletion_disabled: bool,
            deployment_excludes: Vec<String>,
        }
    }
}
