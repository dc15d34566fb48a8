//! Non-Java project files: `application.yml` and `README.md`.

use amis_contract_core::CodegenSettings;

use crate::model::{PageModel, SystemModel};

/// Spring configuration with an in-memory H2 datasource.
pub fn render_application_yml(system: &SystemModel) -> String {
    let db = system.package.rsplit('.').next().unwrap_or("app");
    let mut out = String::new();

    out.push_str("server:\n");
    out.push_str("  port: 8080\n");
    out.push_str("spring:\n");
    out.push_str("  application:\n");
    out.push_str(&format!("    name: {}\n", system.artifact_id));
    out.push_str("  datasource:\n");
    out.push_str(&format!("    url: jdbc:h2:mem:{db};DB_CLOSE_DELAY=-1\n"));
    out.push_str("    driver-class-name: org.h2.Driver\n");
    out.push_str("    username: sa\n");
    out.push_str("    password:\n");
    out.push_str("  jpa:\n");
    out.push_str("    hibernate:\n");
    out.push_str("      ddl-auto: update\n");
    out.push_str("    open-in-view: false\n");
    out
}

/// Project README listing the generated pages.
pub fn render_readme(
    system: &SystemModel,
    settings: &CodegenSettings,
    pages: &[PageModel],
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", system.artifact_id));
    out.push_str(&format!(
        "Spring Boot backend for the `{}` system, generated from interface contracts.\n\n",
        system.system
    ));
    out.push_str(&format!("- **Group:** `{}`\n", settings.group_id));
    out.push_str(&format!("- **Package:** `{}`\n", system.package));
    out.push_str(&format!("- **Application:** `{}`\n", system.app_class));
    out.push_str(&format!("- **Java:** {}\n", settings.java_version));
    out.push_str(&format!("- **Spring Boot:** {}\n\n", settings.spring_boot_version));

    if !pages.is_empty() {
        out.push_str("## Pages\n\n");
        out.push_str("| Page | Entity | Table | Endpoints |\n");
        out.push_str("|------|--------|-------|-----------|\n");
        for page in pages {
            out.push_str(&format!(
                "| {} | {} | `{}` | {} |\n",
                page.page,
                page.entity_class(),
                page.table_name,
                page.endpoints.len()
            ));
        }
        out.push('\n');
    }

    out.push_str("## Build\n\n");
    out.push_str("```bash\n");
    out.push_str("mvn clean package\n");
    out.push_str("mvn spring-boot:run\n");
    out.push_str("```\n");
    out
}
