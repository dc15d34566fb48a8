//! Project layout: reading contract directories and writing backends.
//!
//! Contracts are read from `<openapi_dir>/<system>/<page>.json`. Each system
//! directory becomes `<output_dir>/<system>-backend/`, a Maven project with
//! sources under `src/main/java/<package prefix>/<system>/`. A page whose
//! contract cannot be loaded or has no schema is reported and skipped; the
//! rest of the system is still generated.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use amis_contract_core::{CodegenSettings, ContractDocument, InterfaceContract};

use crate::error::{CodegenError, Result};
use crate::java;
use crate::model::{PageModel, SystemModel};
use crate::pom::render_pom;
use crate::resources::{render_application_yml, render_readme};

/// One rendered file, relative to the backend project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// A page that was not generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: String,
    pub detail: String,
}

/// Result of generating one system's backend.
#[derive(Debug, Clone, Default)]
pub struct SystemOutcome {
    pub system: String,
    pub backend_dir: PathBuf,
    /// Pages generated, in name order.
    pub pages: Vec<String>,
    pub failures: Vec<PageFailure>,
    /// Files written, absolute.
    pub files: Vec<PathBuf>,
    /// Expected paths absent after generation, relative to `backend_dir`.
    pub missing: Vec<PathBuf>,
}

/// Result of a full generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateOutcome {
    pub systems: Vec<SystemOutcome>,
}

impl GenerateOutcome {
    pub fn files_written(&self) -> usize {
        self.systems.iter().map(|s| s.files.len()).sum()
    }

    pub fn pages_generated(&self) -> usize {
        self.systems.iter().map(|s| s.pages.len()).sum()
    }

    pub fn page_failures(&self) -> usize {
        self.systems.iter().map(|s| s.failures.len()).sum()
    }

    /// `true` when every expected path exists in every system.
    pub fn is_consistent(&self) -> bool {
        self.systems.iter().all(|s| s.missing.is_empty())
    }
}

/// Generates one backend project per system directory under `openapi_dir`.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidInput`] when `openapi_dir` is not a
/// directory and [`CodegenError::Io`] when output cannot be written. Page
/// level problems are recorded in [`SystemOutcome::failures`].
pub fn generate_project(
    openapi_dir: &Path,
    output_dir: &Path,
    settings: &CodegenSettings,
) -> Result<GenerateOutcome> {
    let mut outcome = GenerateOutcome::default();
    for (system, pages) in collect_systems(openapi_dir)? {
        let result = generate_system(&system, &pages, output_dir, settings)?;
        info!(
            system = %system,
            pages = result.pages.len(),
            failures = result.failures.len(),
            files = result.files.len(),
            "generated backend"
        );
        outcome.systems.push(result);
    }
    Ok(outcome)
}

/// Lists system directories and their `.json` page files, both sorted by name.
pub fn collect_systems(openapi_dir: &Path) -> Result<Vec<(String, Vec<PathBuf>)>> {
    if !openapi_dir.is_dir() {
        return Err(CodegenError::InvalidInput(format!(
            "contract directory not found: {}",
            openapi_dir.display()
        )));
    }

    let mut systems = Vec::new();
    for entry in fs::read_dir(openapi_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(system) = path.file_name().and_then(OsStr::to_str) else {
            continue;
        };

        let mut pages = Vec::new();
        for page in fs::read_dir(&path)? {
            let page = page?.path();
            if page.is_file() && page.extension() == Some(OsStr::new("json")) {
                pages.push(page);
            }
        }
        pages.sort();
        systems.push((system.to_string(), pages));
    }
    systems.sort();
    Ok(systems)
}

/// Reads the contract a page is generated from: the first one in the file.
pub fn load_page_contract(path: &Path) -> Result<InterfaceContract> {
    let raw = fs::read_to_string(path)?;
    let document: ContractDocument = serde_json::from_str(&raw)?;
    if document.len() > 1 {
        warn!(
            document = %path.display(),
            contracts = document.len(),
            "several contracts in one page, generating from the first"
        );
    }
    document.into_contracts().into_iter().next().ok_or_else(|| {
        CodegenError::InvalidInput(format!("no contract in {}", path.display()))
    })
}

fn generate_system(
    system_name: &str,
    page_paths: &[PathBuf],
    output_dir: &Path,
    settings: &CodegenSettings,
) -> Result<SystemOutcome> {
    let system = SystemModel::new(system_name, &settings.package_prefix);
    let backend_dir = output_dir.join(&system.artifact_id);
    let mut outcome = SystemOutcome {
        system: system_name.to_string(),
        backend_dir: backend_dir.clone(),
        ..SystemOutcome::default()
    };

    let mut pages = Vec::new();
    for path in page_paths {
        let page = path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string();
        match load_page_contract(path).and_then(|c| PageModel::build(&system, &page, &c)) {
            Ok(model) => pages.push(model),
            Err(e) => {
                warn!(system = %system_name, page = %page, error = %e, "page skipped");
                outcome.failures.push(PageFailure {
                    page,
                    detail: e.to_string(),
                });
            }
        }
    }

    let files = render_system(&system, settings, &pages);
    outcome.files = write_files(&backend_dir, &files)?;
    outcome.pages = pages.iter().map(|p| p.page.clone()).collect();
    outcome.missing = check_consistency(&backend_dir, &expected_structure(&system, &pages));
    if !outcome.missing.is_empty() {
        warn!(
            system = %system_name,
            missing = outcome.missing.len(),
            "generated project is incomplete"
        );
    }
    Ok(outcome)
}

/// Renders every file of one backend project.
///
/// Entity-level classes are rendered once per table; when two pages share a
/// table the first page wins.
pub fn render_system(
    system: &SystemModel,
    settings: &CodegenSettings,
    pages: &[PageModel],
) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    let mut entities = HashSet::new();

    for page in pages {
        if entities.insert(page.model_class.clone()) {
            files.extend(render_entity_layer(system, page));
        } else {
            debug!(page = %page.page, entity = %page.model_class, "entity already rendered");
        }
    }

    files.push(GeneratedFile {
        path: system.java_root.join(format!("{}.java", system.app_class)),
        content: java::render_application(system),
    });
    files.push(GeneratedFile {
        path: PathBuf::from("src/main/resources/application.yml"),
        content: render_application_yml(system),
    });
    files.push(GeneratedFile {
        path: PathBuf::from("README.md"),
        content: render_readme(system, settings, pages),
    });
    files.push(GeneratedFile {
        path: PathBuf::from("pom.xml"),
        content: render_pom(&system.artifact_id, settings),
    });

    for page in pages {
        files.extend(render_page_layer(system, page));
    }
    files
}

fn render_entity_layer(system: &SystemModel, page: &PageModel) -> Vec<GeneratedFile> {
    let root = &system.java_root;
    vec![
        GeneratedFile {
            path: root.join("entity").join(format!("{}.java", page.entity_class())),
            content: java::render_entity(system, page),
        },
        GeneratedFile {
            path: root
                .join("repository")
                .join(format!("{}.java", page.repository_class())),
            content: java::render_repository(system, page),
        },
        GeneratedFile {
            path: root
                .join("model")
                .join(format!("{}.java", page.model_pojo_class())),
            content: java::render_model(system, page),
        },
    ]
}

fn render_page_layer(system: &SystemModel, page: &PageModel) -> Vec<GeneratedFile> {
    let dir = system.java_root.join(&page.page_segment);
    vec![
        GeneratedFile {
            path: dir
                .join("controller")
                .join(format!("{}.java", page.controller_class())),
            content: java::render_controller(page),
        },
        GeneratedFile {
            path: dir
                .join("service")
                .join(format!("{}.java", page.service_class())),
            content: java::render_service(page),
        },
        GeneratedFile {
            path: dir
                .join("service")
                .join("impl")
                .join(format!("{}.java", page.service_impl_class())),
            content: java::render_service_impl(system, page),
        },
        GeneratedFile {
            path: dir.join("dto").join(format!("{}.java", page.dto_class())),
            content: java::render_dto(page),
        },
    ]
}

/// Writes `files` under `root`, creating directories as needed.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = root.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.content)?;
        debug!(path = %target.display(), "wrote file");
        written.push(target);
    }
    Ok(written)
}

/// Paths every generated project must contain, relative to its root.
pub fn expected_structure(system: &SystemModel, pages: &[PageModel]) -> Vec<PathBuf> {
    let root = &system.java_root;
    let mut expected = vec![
        PathBuf::from("pom.xml"),
        PathBuf::from("src/main/resources/application.yml"),
        root.join(format!("{}.java", system.app_class)),
    ];
    if pages.is_empty() {
        return expected;
    }

    for layer in ["entity", "repository", "model"] {
        expected.push(root.join(layer));
    }
    for page in pages {
        let dir = root.join(&page.page_segment);
        for layer in ["controller", "service", "service/impl", "dto"] {
            expected.push(dir.join(layer));
        }
    }
    expected
}

/// Returns the expected paths missing under `backend_dir`.
pub fn check_consistency(backend_dir: &Path, expected: &[PathBuf]) -> Vec<PathBuf> {
    expected
        .iter()
        .filter(|path| !backend_dir.join(path).exists())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use amis_contract_core::{FieldDescriptor, ObjectSchema};

    use super::*;

    fn page(system: &SystemModel, name: &str, table: &str) -> PageModel {
        let title = amis_contract_core::naming::upper_camel(table);
        let mut contract = InterfaceContract::new(title, table);
        contract.set_schema(ObjectSchema::from_fields(&[FieldDescriptor::new("id")]));
        PageModel::build(system, name, &contract).unwrap()
    }

    #[test]
    fn test_render_system_layout() {
        let system = SystemModel::new("trade", "com.hg");
        let pages = vec![page(&system, "trade_info", "ODS_TRADE_INFO")];
        let files = render_system(&system, &CodegenSettings::default(), &pages);

        let paths: Vec<String> = files
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            vec![
                "src/main/java/com/hg/trade/entity/OdsTradeInfoEntity.java",
                "src/main/java/com/hg/trade/repository/OdsTradeInfoRepository.java",
                "src/main/java/com/hg/trade/model/OdsTradeInfoModel.java",
                "src/main/java/com/hg/trade/TradeApiApplication.java",
                "src/main/resources/application.yml",
                "README.md",
                "pom.xml",
                "src/main/java/com/hg/trade/trade_info/controller/TradeInfoController.java",
                "src/main/java/com/hg/trade/trade_info/service/TradeInfoService.java",
                "src/main/java/com/hg/trade/trade_info/service/impl/TradeInfoServiceImpl.java",
                "src/main/java/com/hg/trade/trade_info/dto/OdsTradeInfoDTO.java",
            ]
        );
    }

    #[test]
    fn test_shared_table_renders_entity_once() {
        let system = SystemModel::new("trade", "com.hg");
        let pages = vec![
            page(&system, "trade_info", "ODS_TRADE_INFO"),
            page(&system, "trade_audit", "ODS_TRADE_INFO"),
        ];
        let files = render_system(&system, &CodegenSettings::default(), &pages);
        let entities = files
            .iter()
            .filter(|f| f.path.ends_with("OdsTradeInfoEntity.java"))
            .count();
        assert_eq!(entities, 1);
        assert_eq!(files.len(), 3 + 4 + 8);
    }

    #[test]
    fn test_consistency_reports_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let system = SystemModel::new("trade", "com.hg");
        let pages = vec![page(&system, "trade_info", "ODS_TRADE_INFO")];
        let expected = expected_structure(&system, &pages);

        assert_eq!(check_consistency(dir.path(), &expected).len(), expected.len());

        let files = render_system(&system, &CodegenSettings::default(), &pages);
        write_files(dir.path(), &files).unwrap();
        assert!(check_consistency(dir.path(), &expected).is_empty());
    }

    #[test]
    fn test_collect_systems_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_systems(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidInput(_)));
    }
}
