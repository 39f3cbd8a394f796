//! Actions that talk to Git remotes.

pipeline_action! {
    /// Pushes the pipeline's revision to another Git remote.
    GitPush {
        args: GitPushArgs,
        state: GitPushState,
        props: GitPushProps,
        type_token: "conveyor:pipeline/gitPush:GitPush",
        kind: "PUSH",
        replace_on_change: false,
        required {
            /// Remote repository url.
            push_url: String,
            /// Branch to push to.
            remote_branch: String,
            /// `HTTP`, `SSH` or `INTEGRATION`.
            authentication_mode: String,
        }
        optional {
            /// Required when `authentication_mode` is `HTTP`.
            login: String,
            /// Required when `authentication_mode` is `HTTP`.
            password: String,
            /// Required when `authentication_mode` is `INTEGRATION`.
            integration: crate::types::IntegrationSource,
            /// Overwrite the remote branch history.
            force: bool,
            /// Push tags along with the branch.
            push_tags: bool,
            /// Paths left out of the push.
            deployment_excludes: Vec<String>,
            /// Subdirectory of the repository to push.
            input_dir: String,
        }
    }
}

pipeline_action! {
    /// Creates a tag on the pipeline's revision.
    GitTag {
        args: GitTagArgs,
        state: GitTagState,
        props: GitTagProps,
        type_token: "conveyor:pipeline/gitTag:GitTag",
        kind: "GIT_TAG",
        replace_on_change: false,
        required {
            /// Tag to create. Supports `$VARIABLE` expansion.
            tag_name: String,
        }
        optional {
            /// Annotation message; creates an annotated tag when set.
            tag_message: String,
            /// Move the tag if it already exists.
            force: bool,
        }
    }
}
