//! Actions that run commands.

pipeline_action! {
    /// Runs commands inside a container built from a Docker image.
    Build {
        args: BuildArgs,
        state: BuildState,
        props: BuildProps,
        type_token: "conveyor:pipeline/build:Build",
        kind: "BUILD",
        replace_on_change: false,
        required {
            /// Image the commands run in, e.g. `library/rust`.
            docker_image_name: String,
            /// Tag of `docker_image_name`.
            docker_image_tag: String,
            /// Commands run in order; the first failure stops the action.
            execute_commands: Vec<String>,
        }
        optional {
            /// Commands run once when the container image is prepared.
            setup_commands: String,
            /// Shell to run commands with: `SH` or `BASH`.
            shell: String,
            /// Directory the commands run in.
            working_directory: String,
            /// Paths cached between runs.
            cached_dirs: Vec<String>,
            /// Mount path of the pipeline filesystem inside the container.
            volume_mappings: Vec<String>,
            /// Registry integration for private images.
            integration: crate::types::IntegrationSource,
            /// Registry address for private images.
            registry: String,
        }
    }
}

pipeline_action! {
    /// Runs commands on a remote host over SSH.
    SshCommand {
        args: SshCommandArgs,
        state: SshCommandState,
        props: SshCommandProps,
        type_token: "conveyor:pipeline/sshCommand:SshCommand",
        kind: "SSH_COMMAND",
        replace_on_change: false,
        required {
            /// Host name or IP address.
            host: String,
            /// SSH port.
            port: String,
            /// `PASS`, `PRIVATE_KEY`, `PRIVATE_KEY_AND_PASS`, `ENV_KEY` or `PROXY_CREDENTIALS`.
            authentication_mode: String,
            /// Commands run in order.
            commands: Vec<String>,
        }
        optional {
            /// User to log in as.
            login: String,
            /// Required when `authentication_mode` is `PASS`.
            password: String,
            /// Required when `authentication_mode` is `PRIVATE_KEY`.
            key: String,
            /// Passphrase of `key`.
            passphrase: String,
            /// Directory the commands run in.
            working_directory: String,
            /// Run every command in a single shell session.
            run_as_script: bool,
            /// `SH` or `BASH`.
            shell: String,
            /// Proxy host to jump through.
            proxy_host: String,
            /// Integration holding SSH credentials.
            integration: crate::types::IntegrationSource,
        }
    }
}

pipeline_action! {
    /// Pauses the pipeline for a fixed time.
    Sleep {
        args: SleepArgs,
        state: SleepState,
        props: SleepProps,
        type_token: "conveyor:pipeline/sleep:Sleep",
        kind: "SLEEP",
        replace_on_change: false,
        required {
            /// Seconds to wait.
            sleep_in_seconds: i64,
        }
        optional {}
    }
}
