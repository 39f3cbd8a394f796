//! Actions that deploy to Kubernetes clusters.
//!
//! Every action here authenticates with `auth_type`: `TOKEN` requires
//! `token`, `CERTS` requires `client_cert` and `client_key`, `BASIC`
//! requires `login` and `password`. Those pairings are not checked here.

pipeline_action! {
    /// Applies manifests with `kubectl apply`.
    KubernetesApply {
        args: KubernetesApplyArgs,
        state: KubernetesApplyState,
        props: KubernetesApplyProps,
        type_token: "conveyor:pipeline/kubernetesApply:KubernetesApply",
        kind: "KUBERNETES_APPLY",
        replace_on_change: false,
        required {
            /// `TOKEN`, `CERTS` or `BASIC`.
            auth_type: String,
            /// Manifest file or directory.
            config_path: String,
        }
        optional {
            server: String,
            token: String,
            client_cert: String,
            client_key: String,
            login: String,
            password: String,
            namespace: String,
            /// `kubectl` version to run.
            kubectl_version: String,
            /// Wait for the rollout to finish.
            wait_for_deploy: bool,
            /// Integration holding cluster credentials.
            integration: crate::types::IntegrationSource,
        }
    }
}

pipeline_action! {
    /// Updates the image of one container in a deployment.
    KubernetesSetImage {
        args: KubernetesSetImageArgs,
        state: KubernetesSetImageState,
        props: KubernetesSetImageProps,
        type_token: "conveyor:pipeline/kubernetesSetImage:KubernetesSetImage",
        kind: "KUBERNETES_SET_IMAGE",
        replace_on_change: false,
        required {
            auth_type: String,
            deployment_name: String,
            container_name: String,
            /// Full image reference including tag.
            image: String,
        }
        optional {
            server: String,
            token: String,
            client_cert: String,
            client_key: String,
            login: String,
            password: String,
            namespace: String,
            kubectl_version: String,
            wait_for_deploy: bool,
            integration: crate::types::IntegrationSource,
        }
    }
}

pipeline_action! {
    /// Runs a one-off Kubernetes job.
    ///
    /// Any change replaces the action.
    KubernetesRunJob {
        args: KubernetesRunJobArgs,
        state: KubernetesRunJobState,
        props: KubernetesRunJobProps,
        type_token: "conveyor:pipeline/kubernetesRunJob:KubernetesRunJob",
        kind: "KUBERNETES_RUN_JOB",
        replace_on_change: true,
        required {
            auth_type: String,
            job_name: String,
            image: String,
            commands: Vec<String>,
        }
        optional {
            server: String,
            token: String,
            client_cert: String,
            client_key: String,
            login: String,
            password: String,
            namespace: String,
            kubectl_version: String,
            /// Delete the job once it finishes.
            delete_after_completion: bool,
            /// Seconds the job may run.
            active_deadline_seconds: i64,
            integration: crate::types::IntegrationSource,
        }
    }
}

pipeline_action! {
    /// Installs or upgrades a Helm release.
    HelmCharts {
        args: HelmChartsArgs,
        state: HelmChartsState,
        props: HelmChartsProps,
        type_token: "conveyor:pipeline/helmCharts:HelmCharts",
        kind: "HELM",
        replace_on_change: false,
        required {
            auth_type: String,
            /// Helm client version.
            helm_version: String,
            /// Chart reference or local path.
            chart_name: String,
        }
        optional {
            server: String,
            token: String,
            client_cert: String,
            client_key: String,
            login: String,
            password: String,
            namespace: String,
            release_name: String,
            chart_version: String,
            /// Chart repository url. Required when `chart_name` is not a local path.
            helm_repository_url: String,
            /// Values files passed with `-f`.
            values_files: Vec<String>,
            /// `--set` overrides as `KEY=VALUE`.
            set_values: Vec<String>,
            integration: crate::types::IntegrationSource,
        }
    }
}
