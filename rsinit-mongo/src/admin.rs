use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use rsinit::{AdminError, ConnectionSettings, ReplicaSetAdmin, ReplicaSetConfig};
use serde_json::Value;

/// Admin handle for one mongod, talking to its `admin` database.
pub struct MongoAdmin {
    target: String,
    db: Database,
}

impl MongoAdmin {
    /// Build a client for `settings.uri`.
    ///
    /// The connection is always direct: a member without a replica set
    /// config cannot be discovered through replica set monitoring.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, AdminError> {
        let mut options = ClientOptions::parse(settings.uri.as_str())
            .await
            .map_err(|e| AdminError::transport(format!("Invalid uri {}: {}", settings.uri, e)))?;

        options.direct_connection = Some(true);
        options.server_selection_timeout = Some(settings.server_selection_timeout());
        if let Some(app_name) = &settings.app_name {
            options.app_name = Some(app_name.clone());
        }

        let target = options
            .hosts
            .first()
            .map(|h| h.to_string())
            .unwrap_or_else(|| settings.uri.clone());

        let client = Client::with_options(options).map_err(to_admin_error)?;

        tracing::debug!(host = %target, "mongodb client ready");

        Ok(Self {
            target,
            db: client.database("admin"),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn run(&self, command: Document) -> Result<Value, AdminError> {
        let name = command.keys().next().cloned().unwrap_or_default();
        let reply = self.db.run_command(command).await.map_err(|e| {
            let err = to_admin_error(e);
            tracing::debug!(host = %self.target, command = %name, error = %err, "admin command failed");
            err
        })?;
        Ok(reply_to_json(reply))
    }
}

#[async_trait]
impl ReplicaSetAdmin for MongoAdmin {
    async fn replica_set_status(&self) -> Result<Value, AdminError> {
        self.run(doc! { "replSetGetStatus": 1 }).await
    }

    async fn initiate(&self, config: &ReplicaSetConfig) -> Result<Value, AdminError> {
        let config = config_document(config)?;
        self.run(doc! { "replSetInitiate": config }).await
    }
}

/// `replSetInitiate` payload. Member ids go out as 32-bit ints.
pub fn config_document(config: &ReplicaSetConfig) -> Result<Document, AdminError> {
    let mut members = Vec::with_capacity(config.members.len());
    for member in &config.members {
        let id = i32::try_from(member.id).map_err(|_| {
            AdminError::transport(format!("member id {} out of range", member.id))
        })?;
        members.push(Bson::Document(doc! {
            "_id": id,
            "host": member.host.as_str(),
        }));
    }

    Ok(doc! {
        "_id": config.id.as_str(),
        "members": members,
    })
}

/// Server replies as relaxed extended JSON.
pub fn reply_to_json(reply: Document) -> Value {
    Bson::Document(reply).into_relaxed_extjson()
}

fn to_admin_error(err: mongodb::error::Error) -> AdminError {
    match err.kind.as_ref() {
        ErrorKind::Command(cmd) => {
            AdminError::command(cmd.code, cmd.code_name.clone(), cmd.message.clone())
        }
        _ => AdminError::transport(err.to_string()),
    }
}
