//! Maven build descriptor.

use std::collections::HashSet;

use amis_contract_core::{CodegenSettings, MavenDependency, MavenRepository};

/// Dependencies every generated backend needs, in output order.
pub fn essential_dependencies() -> Vec<MavenDependency> {
    vec![
        MavenDependency::new("org.springframework.boot", "spring-boot-starter-data-jpa"),
        MavenDependency::new("org.springframework.boot", "spring-boot-starter-web"),
        MavenDependency::new("org.springframework.boot", "spring-boot-starter-validation"),
        MavenDependency::new("com.h2database", "h2").with_scope("runtime"),
        MavenDependency::new("jakarta.persistence", "jakarta.persistence-api")
            .with_scope("provided"),
    ]
}

/// Appends `extra` to `base`, dropping any (groupId, artifactId) already seen.
///
/// ```
/// use amis_contract_codegen::pom::{essential_dependencies, merge_dependencies};
/// use amis_contract_core::MavenDependency;
///
/// let extra = vec![
///     MavenDependency::new("org.springframework.boot", "spring-boot-starter-web")
///         .with_version("9"),
///     MavenDependency::new("com.hg", "common-backend").with_version("1.0.0"),
/// ];
/// let merged = merge_dependencies(&essential_dependencies(), &extra);
/// assert_eq!(merged.len(), 6);
/// assert_eq!(merged[1].version, None);
/// assert_eq!(merged[5].artifact_id, "common-backend");
/// ```
pub fn merge_dependencies(
    base: &[MavenDependency],
    extra: &[MavenDependency],
) -> Vec<MavenDependency> {
    let mut seen = HashSet::new();
    base.iter()
        .chain(extra)
        .filter(|dep| seen.insert((dep.group_id.as_str(), dep.artifact_id.as_str())))
        .cloned()
        .collect()
}

/// Drops empty and whitespace-only lines.
pub fn remove_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Renders `pom.xml` for `artifact_id`.
pub fn render_pom(artifact_id: &str, settings: &CodegenSettings) -> String {
    let dependencies = merge_dependencies(&essential_dependencies(), &settings.dependencies);
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n");
    out.push_str("         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n");
    out.push_str("         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 ");
    out.push_str("https://maven.apache.org/xsd/maven-4.0.0.xsd\">\n");
    out.push_str("    <modelVersion>4.0.0</modelVersion>\n\n");

    out.push_str("    <parent>\n");
    out.push_str("        <groupId>org.springframework.boot</groupId>\n");
    out.push_str("        <artifactId>spring-boot-starter-parent</artifactId>\n");
    out.push_str(&format!(
        "        <version>{}</version>\n",
        xml(&settings.spring_boot_version)
    ));
    out.push_str("        <relativePath/>\n");
    out.push_str("    </parent>\n\n");

    out.push_str(&format!("    <groupId>{}</groupId>\n", xml(&settings.group_id)));
    out.push_str(&format!("    <artifactId>{}</artifactId>\n", xml(artifact_id)));
    out.push_str(&format!("    <version>{}</version>\n", xml(&settings.version)));
    out.push_str("    <packaging>jar</packaging>\n\n");

    out.push_str("    <properties>\n");
    out.push_str(&format!(
        "        <java.version>{}</java.version>\n",
        xml(&settings.java_version)
    ));
    out.push_str(&format!(
        "        <spring-cloud.version>{}</spring-cloud.version>\n",
        xml(&settings.spring_cloud_version)
    ));
    out.push_str("        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>\n");
    out.push_str("    </properties>\n\n");

    out.push_str("    <dependencyManagement>\n");
    out.push_str("        <dependencies>\n");
    out.push_str("            <dependency>\n");
    out.push_str("                <groupId>org.springframework.cloud</groupId>\n");
    out.push_str("                <artifactId>spring-cloud-dependencies</artifactId>\n");
    out.push_str("                <version>${spring-cloud.version}</version>\n");
    out.push_str("                <type>pom</type>\n");
    out.push_str("                <scope>import</scope>\n");
    out.push_str("            </dependency>\n");
    out.push_str("        </dependencies>\n");
    out.push_str("    </dependencyManagement>\n\n");

    out.push_str("    <dependencies>\n");
    for dep in &dependencies {
        push_dependency(&mut out, dep);
    }
    out.push_str("    </dependencies>\n\n");

    if !settings.repositories.is_empty() {
        out.push_str("    <repositories>\n");
        for repo in &settings.repositories {
            push_repository(&mut out, repo);
        }
        out.push_str("    </repositories>\n\n");
    }

    out.push_str("    <build>\n");
    out.push_str("        <plugins>\n");
    out.push_str("            <plugin>\n");
    out.push_str("                <groupId>org.apache.maven.plugins</groupId>\n");
    out.push_str("                <artifactId>maven-compiler-plugin</artifactId>\n");
    out.push_str("                <configuration>\n");
    out.push_str("                    <release>${java.version}</release>\n");
    out.push_str("                </configuration>\n");
    out.push_str("            </plugin>\n");
    out.push_str("            <plugin>\n");
    out.push_str("                <groupId>org.springframework.boot</groupId>\n");
    out.push_str("                <artifactId>spring-boot-maven-plugin</artifactId>\n");
    out.push_str("            </plugin>\n");
    out.push_str("        </plugins>\n");
    out.push_str("    </build>\n");
    out.push_str("</project>\n");

    remove_blank_lines(&out)
}

fn push_dependency(out: &mut String, dep: &MavenDependency) {
    out.push_str("        <dependency>\n");
    out.push_str(&format!("            <groupId>{}</groupId>\n", xml(&dep.group_id)));
    out.push_str(&format!(
        "            <artifactId>{}</artifactId>\n",
        xml(&dep.artifact_id)
    ));
    if let Some(version) = &dep.version {
        out.push_str(&format!("            <version>{}</version>\n", xml(version)));
    }
    if let Some(scope) = &dep.scope {
        out.push_str(&format!("            <scope>{}</scope>\n", xml(scope)));
    }
    out.push_str("        </dependency>\n");
}

fn push_repository(out: &mut String, repo: &MavenRepository) {
    out.push_str("        <repository>\n");
    out.push_str(&format!("            <id>{}</id>\n", xml(&repo.id)));
    out.push_str(&format!("            <url>{}</url>\n", xml(&repo.url)));
    out.push_str("        </repository>\n");
}

fn xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
