use super::BuildFileListUpdater;
use crate::config::Settings;
use crate::fs::{write_if_changed, FileSystem};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Emits generated files as a VPC `$Folder` that project scripts `$Include`
pub struct VpcFileListWriter {
    fs: Arc<dyn FileSystem>,
}

impl VpcFileListWriter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn render(filenames: &[String]) -> String {
        let mut out = String::new();
        out.push_str(
            "//=============================================================================//\n",
        );
        out.push_str("// This file is automatically generated. CHANGES WILL BE LOST.\n");
        out.push_str(
            "//=============================================================================//\n",
        );
        out.push('\n');
        out.push_str("$Project\n{\n");
        out.push_str("\t$Folder\t\"Source Files\"\n\t{\n");
        out.push_str("\t\t$Folder\t\"Autogenerated\"\n\t\t{\n");
        for file in filenames {
            out.push_str(&format!("\t\t\t$File\t\"$SRCDIR/{}\"\n", file));
        }
        out.push_str("\t\t}\n\t}\n}\n");
        out
    }

    /// Entries of `filenames` with no file under `src_dir`
    pub fn missing_files<'a>(&self, src_dir: &Path, filenames: &'a [String]) -> Vec<&'a str> {
        filenames
            .iter()
            .filter(|file| !self.fs.exists(&src_dir.join(file.as_str())))
            .map(String::as_str)
            .collect()
    }
}

impl BuildFileListUpdater for VpcFileListWriter {
    fn generate(
        &self,
        _settings: &Settings,
        filenames: &[String],
        src_dir: &Path,
        target: &Path,
    ) -> Result<()> {
        for file in self.missing_files(src_dir, filenames) {
            warn!("{} is listed but does not exist under {}", file, src_dir.display());
        }

        let content = Self::render(filenames);
        let written = write_if_changed(self.fs.as_ref(), target, &content)
            .with_context(|| format!("Failed to write file list {}", target.display()))?;

        if written {
            info!("Updated {} ({} files)", target.display(), filenames.len());
        } else {
            debug!("{} is up to date", target.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn settings() -> Settings {
        Settings::from_toml_str(
            r#"
src_path = "/src"
vpc_server_path = "/src/game/server/server.vpc"
vpc_client_path = "/src/game/client/client.vpc"
client_path = "game/client"
server_path = "game/server"
shared_path = "game/shared"
"#,
            Path::new("/"),
        )
        .unwrap()
    }

    #[test]
    fn test_render_lists_files_under_srcdir() {
        let content = VpcFileListWriter::render(&[
            "game/shared/physics.cpp".to_string(),
            "game/server/entities.cpp".to_string(),
        ]);

        assert!(content.contains("$Folder\t\"Autogenerated\""));
        assert!(content.contains(
            "\t\t\t$File\t\"$SRCDIR/game/shared/physics.cpp\"\n\t\t\t$File\t\"$SRCDIR/game/server/entities.cpp\"\n"
        ));
    }

    #[test]
    fn test_generate_writes_only_on_change() {
        let fs = Arc::new(MockFileSystem::new());
        let writer = VpcFileListWriter::new(fs.clone());
        let target = Path::new("/src/game/server/python_autogenerated.vpc");
        let files = vec!["game/server/entities.cpp".to_string()];

        writer
            .generate(&settings(), &files, Path::new("/src"), target)
            .unwrap();
        writer
            .generate(&settings(), &files, Path::new("/src"), target)
            .unwrap();

        assert_eq!(fs.write_count(), 1);
        assert!(fs.content(target).unwrap().contains("entities.cpp"));
    }

    #[test]
    fn test_missing_files_resolve_against_project_source_root() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/mod/src/game/server/entities.cpp", "");
        fs.add_file("/src/game/server/gamerules.cpp", "");
        let writer = VpcFileListWriter::new(fs);
        let files = vec![
            "game/server/entities.cpp".to_string(),
            "game/server/gamerules.cpp".to_string(),
        ];

        assert_eq!(
            writer.missing_files(Path::new("/mod/src"), &files),
            vec!["game/server/gamerules.cpp"]
        );
        assert_eq!(
            writer.missing_files(Path::new("/src"), &files),
            vec!["game/server/entities.cpp"]
        );
    }
}
