//! Top-level generation entry points.

use std::path::PathBuf;

use crate::artifact::Artifact;
use crate::config::Config;
use crate::delegates::Delegates;
use crate::driver::Driver;
use crate::error::Result;
use crate::model::ServiceModel;
use crate::persist::{ArtifactWriter, FsWriter};

/// Generate every configured artifact below `config.output_dir`.
///
/// Returns the paths written, in generation order.
pub async fn generate(config: &Config) -> Result<Vec<PathBuf>> {
    let writer = FsWriter::new(&config.output_dir);
    let artifacts = generate_with(config, &writer).await?;
    Ok(artifacts
        .iter()
        .map(|artifact| writer.root().join(&artifact.path))
        .collect())
}

/// Generate every configured artifact into `writer`.
pub async fn generate_with<W: ArtifactWriter>(config: &Config, writer: &W) -> Result<Vec<Artifact>> {
    config.validate()?;

    // 1. Load the service model
    log::info!("Loading service model from {}", config.model_path);
    let model = ServiceModel::from_file_or_url(&config.model_path).await?;

    // 2. One delegate per configured kind
    let delegates = Delegates::from_config(config);

    // 3. Render everything, then persist
    let driver = Driver::new(config)?;
    driver
        .generate(&model, &config.artifact_kinds, &delegates, writer)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::persist::MemoryWriter;
    use tempfile::TempDir;

    const MODEL: &str = r#"
operations:
  GetUser:
    input: UserIdInput
    output: UserOutput
    errors: [NotFound]
    http:
      path: /users/{id}
      method: GET
      status_codes:
        success: 200
        NotFound: 404
shapes:
  UserIdInput:
    fields:
      - { name: id, location: path, type: String }
  UserOutput:
    fields:
      - { name: name, type: String }
"#;

    #[tokio::test]
    async fn test_generate_writes_every_kind() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let model_path = temp_dir.path().join("model.yaml");
        tokio::fs::write(&model_path, MODEL).await?;
        let output_dir = temp_dir.path().join("generated");

        let config = Config::new(
            "PetStore",
            model_path.to_string_lossy(),
            output_dir.to_string_lossy(),
        );
        let written = generate(&config).await?;

        assert_eq!(written.len(), ArtifactKind::all().count());
        for kind in ArtifactKind::all() {
            assert!(output_dir.join(kind.destination("PetStore")).is_file());
        }
        let stubs =
            tokio::fs::read_to_string(output_dir.join("pet_store/server_stubs.rs")).await?;
        assert!(stubs.contains("Self::NotFound => 404,"));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_with_memory_writer() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let model_path = temp_dir.path().join("model.yaml");
        tokio::fs::write(&model_path, MODEL).await?;

        let mut config = Config::new("PetStore", model_path.to_string_lossy(), "unused");
        config.artifact_kinds = vec![ArtifactKind::Client];
        let writer = MemoryWriter::new();
        let artifacts = generate_with(&config, &writer).await?;

        assert_eq!(artifacts.len(), 1);
        let client = writer
            .get("pet_store/client.rs")
            .unwrap_or_default();
        assert!(client.contains("fn get_user(&self, input: UserIdInput) -> Result<UserOutput, PetStoreError>;"));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_config() {
        let mut config = Config::new("PetStore", "model.yaml", "out");
        config.artifact_kinds.clear();
        assert!(generate(&config).await.is_err());
    }
}
