use serde_json::Value;

/// Records a user action on the `audit` tracing target.
pub fn log_audit(user: Option<&str>, action: &str, resource: Option<&str>, metadata: Option<Value>) {
    let user = user.unwrap_or("-");
    let resource = resource.unwrap_or("-");
    let metadata = metadata.unwrap_or(Value::Null).to_string();
    tracing::info!(target: "audit", user, action, resource, metadata = metadata.as_str(), "audit");
}
