//! String<->enum mappings shared by every repository, since Postgres
//! stores Memoria's closed enums as plain `TEXT`/`TEXT[]` rather than
//! native Postgres enum types (simpler to migrate forward: adding a
//! variant is an application-side change, not an `ALTER TYPE`).

use memoria_core::{ApiKeyStatus, Modality, ProcessingStatus, ProviderType, Role, Status};

pub fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Root => "ROOT",
        Role::User => "USER",
    }
}

pub fn role_from_str(raw: &str) -> Result<Role, Status> {
    match raw {
        "ROOT" => Ok(Role::Root),
        "USER" => Ok(Role::User),
        other => Err(Status::internal(format!("unknown role in storage: {other}"))),
    }
}

pub fn api_key_status_to_str(status: ApiKeyStatus) -> &'static str {
    match status {
        ApiKeyStatus::Active => "ACTIVE",
        ApiKeyStatus::Inactive => "INACTIVE",
    }
}

pub fn api_key_status_from_str(raw: &str) -> Result<ApiKeyStatus, Status> {
    match raw {
        "ACTIVE" => Ok(ApiKeyStatus::Active),
        "INACTIVE" => Ok(ApiKeyStatus::Inactive),
        other => Err(Status::internal(format!("unknown api key status: {other}"))),
    }
}

pub fn provider_type_to_str(p: ProviderType) -> &'static str {
    match p {
        ProviderType::Unspecified => "UNSPECIFIED",
        ProviderType::Openai => "OPENAI",
        ProviderType::Vllm => "VLLM",
        ProviderType::Tei => "TEI",
    }
}

pub fn provider_type_from_str(raw: &str) -> Result<ProviderType, Status> {
    match raw {
        "UNSPECIFIED" => Ok(ProviderType::Unspecified),
        "OPENAI" => Ok(ProviderType::Openai),
        "VLLM" => Ok(ProviderType::Vllm),
        "TEI" => Ok(ProviderType::Tei),
        other => Err(Status::internal(format!("unknown provider type: {other}"))),
    }
}

pub fn modality_to_str(m: Modality) -> &'static str {
    match m {
        Modality::Text => "TEXT",
        Modality::Image => "IMAGE",
        Modality::Audio => "AUDIO",
        Modality::Video => "VIDEO",
    }
}

pub fn modality_from_str(raw: &str) -> Result<Modality, Status> {
    match raw {
        "TEXT" => Ok(Modality::Text),
        "IMAGE" => Ok(Modality::Image),
        "AUDIO" => Ok(Modality::Audio),
        "VIDEO" => Ok(Modality::Video),
        other => Err(Status::internal(format!("unknown modality: {other}"))),
    }
}

pub fn modalities_to_strings(modalities: &[Modality]) -> Vec<String> {
    modalities.iter().map(|&m| modality_to_str(m).to_string()).collect()
}

pub fn modalities_from_strings(raw: &[String]) -> Result<Vec<Modality>, Status> {
    raw.iter().map(|s| modality_from_str(s)).collect()
}

pub fn processing_status_to_str(s: ProcessingStatus) -> &'static str {
    match s {
        ProcessingStatus::Pending => "PENDING",
        ProcessingStatus::Processing => "PROCESSING",
        ProcessingStatus::Completed => "COMPLETED",
        ProcessingStatus::Failed => "FAILED",
    }
}

pub fn processing_status_from_str(raw: &str) -> Result<ProcessingStatus, Status> {
    match raw {
        "PENDING" => Ok(ProcessingStatus::Pending),
        "PROCESSING" => Ok(ProcessingStatus::Processing),
        "COMPLETED" => Ok(ProcessingStatus::Completed),
        "FAILED" => Ok(ProcessingStatus::Failed),
        other => Err(Status::internal(format!("unknown processing status: {other}"))),
    }
}
