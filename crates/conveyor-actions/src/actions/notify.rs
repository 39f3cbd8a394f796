//! Actions that send notifications.

pipeline_action! {
    /// Posts a message to a Slack channel.
    Slack {
        args: SlackArgs,
        state: SlackState,
        props: SlackProps,
        type_token: "conveyor:pipeline/slack:Slack",
        kind: "SLACK",
        replace_on_change: false,
        required {
            /// Channel id or `#name`.
            channel: String,
            /// Message text. Supports `$VARIABLE` expansion.
            content: String,
            /// Slack integration. A full integration object is sent as its hash id.
            integration: crate::types::IntegrationSource,
        }
        optional {
            /// Block Kit JSON; replaces `content` when set.
            blocks: String,
            /// Mention these users in the message.
            send_to: Vec<String>,
        }
    }
}

pipeline_action! {
    /// Sends an email.
    Email {
        args: EmailArgs,
        state: EmailState,
        props: EmailProps,
        type_token: "conveyor:pipeline/email:Email",
        kind: "EMAIL",
        replace_on_change: false,
        required {
            recipients: Vec<String>,
            title: String,
            content: String,
        }
        optional {
            /// Send `content` as HTML.
            html: bool,
        }
    }
}

pipeline_action! {
    /// Sends an HTTP request.
    HttpRequest {
        args: HttpRequestArgs,
        state: HttpRequestState,
        props: HttpRequestProps,
        type_token: "conveyor:pipeline/httpRequest:HttpRequest",
        kind: "HTTP",
        replace_on_change: false,
        required {
            endpoint: String,
            /// `GET`, `POST`, `PUT`, `PATCH` or `DELETE`.
            request_method: String,
        }
        optional {
            /// Request body. Only sent with `POST`, `PUT` and `PATCH`.
            content: String,
            /// Headers as `Name: value`.
            headers: Vec<String>,
            /// Fail the action on non-2xx responses.
            fail_on_error: bool,
            /// Variable the response body is stored in.
            output_variable: String,
        }
    }
}
