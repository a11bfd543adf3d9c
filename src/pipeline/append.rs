//! Append-file generation
//!
//! Each build target gets one C++ source declaring the init function of every
//! module routed to it, plus a function registering them all with the
//! embedded interpreter.

use crate::error::PipelineError;
use crate::fs::{write_if_changed, FileSystem};
use crate::modules::ModuleType;
use serde::Serialize;
use std::path::{Path, PathBuf};

const APPEND_TEMPLATE: &str = r#"//=============================================================================//
// This file is automatically generated. CHANGES WILL BE LOST.
//=============================================================================//
#include "cbase.h"
#include "srcpy.h"

// memdbgon must be the last include file in a .cpp file!!!
#include "tier0/memdbgon.h"

using namespace boost::python;

// The init method is in one of the generated files declared
#ifdef _WIN32
{win32decls}
#else
{unixdecls}
#endif // _WIN32

// The append function
void Append{tag}Modules()
{
{appendlist}
}
"#;

/// Result of checking one append file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendFile {
    pub target: ModuleType,
    pub path: PathBuf,
    /// Whether the file content changed and was rewritten
    pub written: bool,
}

/// `client` becomes `Client`
pub fn function_tag(target: ModuleType) -> String {
    let name = target.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `src_append_<target>.cpp`, lowercase; only the function name is capitalized
pub fn append_file_name(target: ModuleType) -> String {
    format!("src_append_{}.cpp", target.as_str())
}

fn join_lines<S: AsRef<str>>(names: &[S], format: impl Fn(&str) -> String) -> String {
    names
        .iter()
        .map(|n| format(n.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the append source for `names`, in the given order
pub fn render_append_code<S: AsRef<str>>(names: &[S], tag: &str) -> String {
    let win32decls = join_lines(names, |n| {
        format!("extern \"C\" __declspec(dllexport) PYINIT_DECL({})();", n)
    });
    let unixdecls = join_lines(names, |n| format!("extern \"C\" PYINIT_DECL({})();", n));
    let appendlist = join_lines(names, |n| format!("\tAPPEND_MODULE({})", n));

    APPEND_TEMPLATE
        .replace("{win32decls}", &win32decls)
        .replace("{unixdecls}", &unixdecls)
        .replace("{tag}", tag)
        .replace("{appendlist}", &appendlist)
}

/// Write the append file for `target` into `dir` when its content changed
pub fn write_append_file<S: AsRef<str>>(
    fs: &dyn FileSystem,
    dir: &Path,
    names: &[S],
    target: ModuleType,
) -> Result<AppendFile, PipelineError> {
    let path = dir.join(append_file_name(target));
    let content = render_append_code(names, &function_tag(target));

    let written = write_if_changed(fs, &path, &content).map_err(|source| {
        PipelineError::Filesystem {
            path: path.clone(),
            source,
        }
    })?;

    Ok(AppendFile {
        target,
        path,
        written,
    })
}
