//! Actions that build and publish container images.

pipeline_action! {
    /// Builds an image from a Dockerfile.
    DockerfileBuild {
        args: DockerfileBuildArgs,
        state: DockerfileBuildState,
        props: DockerfileBuildProps,
        type_token: "conveyor:pipeline/dockerfileBuild:DockerfileBuild",
        kind: "DOCKERFILE",
        replace_on_change: false,
        required {
            /// Path of the Dockerfile relative to the repository root.
            dockerfile_path: String,
        }
        optional {
            /// Build context directory.
            context_path: String,
            /// `--build-arg` values as `KEY=VALUE`.
            build_args: Vec<String>,
            /// Target stage of a multi-stage build.
            target_stage: String,
            /// Target platforms, e.g. `linux/amd64`.
            target_platform: String,
            /// Skip the layer cache.
            do_not_prune_images: bool,
            /// Registry integration for private base images.
            integration: crate::types::IntegrationSource,
        }
    }
}

pipeline_action! {
    /// Pushes an image built earlier in the pipeline.
    DockerImagePush {
        args: DockerImagePushArgs,
        state: DockerImagePushState,
        props: DockerImagePushProps,
        type_token: "conveyor:pipeline/dockerImagePush:DockerImagePush",
        kind: "DOCKER_PUSH",
        replace_on_change: false,
        required {
            /// Tag to push.
            docker_image_tag: String,
            /// Target repository, e.g. `acme/web`.
            repository: String,
        }
        optional {
            /// Registry host; defaults to Docker Hub.
            registry: String,
            /// Required for private registries unless `integration` is set.
            login: String,
            /// Required when `login` is set.
            password: String,
            /// Registry integration, e.g. ECR or GCR.
            integration: crate::types::IntegrationSource,
            /// Push extra tags, e.g. `latest`.
            additional_tags: Vec<String>,
        }
    }
}
