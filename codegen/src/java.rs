//! Java source templates for the Spring Boot backend.
//!
//! Entity, repository and model classes live in the system package and are
//! named after the table; controller, service, service implementation and
//! DTO live in the page package and are named after the page (the DTO after
//! the table).

use amis_contract_core::OperationKind;

use crate::model::{Endpoint, JavaField, PageModel, SystemModel, java_string};

const HEADER: &str = "// Generated by amis2api. Do not edit.\n";

/// `<Model>Entity.java`: JPA entity mapped to the table.
pub fn render_entity(system: &SystemModel, page: &PageModel) -> String {
    let mut out = String::new();
    let class = page.entity_class();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.entity;\n\n", system.package));
    out.push_str("import jakarta.persistence.*;\n\n");

    out.push_str("@Entity\n");
    out.push_str(&format!(
        "@Table(name = \"{}\")\n",
        java_string(&page.table_name)
    ));
    out.push_str(&format!("public class {class} {{\n\n"));

    for field in &page.fields {
        push_label(&mut out, &field.label);
        if field.primary_key {
            out.push_str("    @Id\n");
            if page.synthesized_key {
                out.push_str("    @GeneratedValue(strategy = GenerationType.IDENTITY)\n");
            }
        }
        out.push_str(&format!(
            "    @Column(name = \"{}\")\n",
            java_string(&field.column)
        ));
        if field.is_date() {
            out.push_str("    @Temporal(TemporalType.TIMESTAMP)\n");
        }
        out.push_str(&format!(
            "    private {} {};\n\n",
            field.java_type, field.java_name
        ));
    }

    push_accessors(&mut out, &page.fields);
    out.push_str("}\n");
    out
}

/// `<Model>Repository.java`: Spring Data repository keyed by the primary key.
pub fn render_repository(system: &SystemModel, page: &PageModel) -> String {
    let mut out = String::new();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.repository;\n\n", system.package));
    out.push_str(&format!(
        "import {}.entity.{};\n",
        system.package,
        page.entity_class()
    ));
    out.push_str("import org.springframework.data.jpa.repository.JpaRepository;\n");
    out.push_str("import org.springframework.stereotype.Repository;\n\n");

    out.push_str("@Repository\n");
    out.push_str(&format!(
        "public interface {} extends JpaRepository<{}, {}> {{\n",
        page.repository_class(),
        page.entity_class(),
        page.primary_key().java_type
    ));
    out.push_str("}\n");
    out
}

/// `<Model>Model.java`: plain domain object.
pub fn render_model(system: &SystemModel, page: &PageModel) -> String {
    let mut out = String::new();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.model;\n\n", system.package));
    out.push_str(&format!("public class {} {{\n\n", page.model_pojo_class()));
    push_fields(&mut out, &page.fields);
    push_accessors(&mut out, &page.fields);
    out.push_str("}\n");
    out
}

/// `<Model>DTO.java`: transfer object used by the page controller.
pub fn render_dto(page: &PageModel) -> String {
    let mut out = String::new();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.dto;\n\n", page.package));
    out.push_str("import java.io.Serializable;\n\n");
    out.push_str(&format!(
        "public class {} implements Serializable {{\n\n",
        page.dto_class()
    ));
    out.push_str("    private static final long serialVersionUID = 1L;\n\n");
    push_fields(&mut out, &page.fields);
    push_accessors(&mut out, &page.fields);
    out.push_str("}\n");
    out
}

/// `<Page>Service.java`: service interface.
pub fn render_service(page: &PageModel) -> String {
    let mut out = String::new();
    let dto = page.dto_class();
    let pk = page.primary_key();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.service;\n\n", page.package));
    out.push_str(&format!("import {}.dto.{dto};\n", page.package));
    out.push_str("import java.util.List;\n\n");

    out.push_str(&format!("public interface {} {{\n\n", page.service_class()));
    out.push_str(&format!(
        "    List<{dto}> query({});\n\n",
        query_signature(page)
    ));
    out.push_str(&format!("    {dto} add({dto} dto);\n\n"));
    out.push_str(&format!("    {dto} edit({dto} dto);\n\n"));
    out.push_str(&format!(
        "    void delete({} {});\n\n",
        pk.java_type, pk.java_name
    ));
    out.push_str(&format!(
        "    {dto} view({} {});\n",
        pk.java_type, pk.java_name
    ));
    out.push_str("}\n");
    out
}

/// `<Page>ServiceImpl.java`: repository-backed implementation.
pub fn render_service_impl(system: &SystemModel, page: &PageModel) -> String {
    let mut out = String::new();
    let dto = page.dto_class();
    let entity = page.entity_class();
    let repository = page.repository_class();
    let pk = page.primary_key();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.service.impl;\n\n", page.package));
    out.push_str(&format!("import {}.dto.{dto};\n", page.package));
    out.push_str(&format!(
        "import {}.service.{};\n",
        page.package,
        page.service_class()
    ));
    out.push_str(&format!("import {}.entity.{entity};\n", system.package));
    out.push_str(&format!(
        "import {}.repository.{repository};\n",
        system.package
    ));
    out.push_str("import java.util.List;\n");
    out.push_str("import java.util.stream.Collectors;\n");
    out.push_str("import org.springframework.beans.BeanUtils;\n");
    out.push_str("import org.springframework.data.domain.Example;\n");
    out.push_str("import org.springframework.data.domain.ExampleMatcher;\n");
    out.push_str("import org.springframework.stereotype.Service;\n\n");

    out.push_str("@Service\n");
    out.push_str(&format!(
        "public class {} implements {} {{\n\n",
        page.service_impl_class(),
        page.service_class()
    ));
    out.push_str(&format!("    private final {repository} repository;\n\n"));
    out.push_str(&format!(
        "    public {}({repository} repository) {{\n",
        page.service_impl_class()
    ));
    out.push_str("        this.repository = repository;\n");
    out.push_str("    }\n\n");

    // Query by example over the parameters that map onto entity fields.
    out.push_str("    @Override\n");
    out.push_str(&format!(
        "    public List<{dto}> query({}) {{\n",
        query_signature(page)
    ));
    out.push_str(&format!("        {entity} probe = new {entity}();\n"));
    for param in &page.query_params {
        if let Some(field) = page.field_for_param(param) {
            out.push_str(&format!(
                "        probe.{}({});\n",
                field.setter(),
                param.java_name
            ));
        }
    }
    out.push_str(
        "        ExampleMatcher matcher = ExampleMatcher.matching().withIgnoreNullValues();\n",
    );
    out.push_str("        return repository.findAll(Example.of(probe, matcher)).stream()\n");
    out.push_str("                .map(this::toDto)\n");
    out.push_str("                .collect(Collectors.toList());\n");
    out.push_str("    }\n\n");

    for verb in ["add", "edit"] {
        out.push_str("    @Override\n");
        out.push_str(&format!("    public {dto} {verb}({dto} dto) {{\n"));
        out.push_str(&format!("        {entity} entity = new {entity}();\n"));
        out.push_str("        BeanUtils.copyProperties(dto, entity);\n");
        out.push_str("        return toDto(repository.save(entity));\n");
        out.push_str("    }\n\n");
    }

    out.push_str("    @Override\n");
    out.push_str(&format!(
        "    public void delete({} {}) {{\n",
        pk.java_type, pk.java_name
    ));
    out.push_str(&format!("        repository.deleteById({});\n", pk.java_name));
    out.push_str("    }\n\n");

    out.push_str("    @Override\n");
    out.push_str(&format!(
        "    public {dto} view({} {}) {{\n",
        pk.java_type, pk.java_name
    ));
    out.push_str(&format!(
        "        return repository.findById({}).map(this::toDto).orElse(null);\n",
        pk.java_name
    ));
    out.push_str("    }\n\n");

    out.push_str(&format!("    private {dto} toDto({entity} entity) {{\n"));
    out.push_str(&format!("        {dto} dto = new {dto}();\n"));
    out.push_str("        BeanUtils.copyProperties(entity, dto);\n");
    out.push_str("        return dto;\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

/// `<Page>Controller.java`: one handler per contract operation.
pub fn render_controller(page: &PageModel) -> String {
    let mut out = String::new();
    let service = page.service_class();
    let instance = page.service_instance();

    out.push_str(HEADER);
    out.push_str(&format!("package {}.controller;\n\n", page.package));
    out.push_str(&format!("import {}.dto.{};\n", page.package, page.dto_class()));
    out.push_str(&format!("import {}.service.{service};\n", page.package));
    out.push_str("import java.util.List;\n");
    out.push_str("import org.springframework.web.bind.annotation.*;\n\n");

    out.push_str("@RestController\n");
    out.push_str(&format!("public class {} {{\n\n", page.controller_class()));
    out.push_str(&format!("    private final {service} {instance};\n\n"));
    out.push_str(&format!(
        "    public {}({service} {instance}) {{\n",
        page.controller_class()
    ));
    out.push_str(&format!("        this.{instance} = {instance};\n"));
    out.push_str("    }\n");

    for endpoint in &page.endpoints {
        out.push('\n');
        push_handler(&mut out, page, endpoint, &instance);
    }

    out.push_str("}\n");
    out
}

/// `<UpperCamel(system)>ApiApplication.java`: Spring Boot entry point.
pub fn render_application(system: &SystemModel) -> String {
    let mut out = String::new();

    out.push_str(HEADER);
    out.push_str(&format!("package {};\n\n", system.package));
    out.push_str("import org.springframework.boot.SpringApplication;\n");
    out.push_str("import org.springframework.boot.autoconfigure.SpringBootApplication;\n\n");
    out.push_str("@SpringBootApplication\n");
    out.push_str(&format!("public class {} {{\n\n", system.app_class));
    out.push_str("    public static void main(String[] args) {\n");
    out.push_str(&format!(
        "        SpringApplication.run({}.class, args);\n",
        system.app_class
    ));
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

fn push_handler(out: &mut String, page: &PageModel, endpoint: &Endpoint, instance: &str) {
    let dto = page.dto_class();
    let pk = page.primary_key();
    let pk_in_path = endpoint.path_variables.iter().any(|v| *v == pk.name);
    let keyed = matches!(endpoint.kind, OperationKind::Delete | OperationKind::View);

    let mut args: Vec<String> = endpoint
        .path_variables
        .iter()
        .filter(|v| !keyed || **v != pk.name)
        .map(|v| format!("@PathVariable(\"{v}\") String {}", path_arg(v)))
        .collect();

    if !endpoint.summary.is_empty() {
        push_label(out, &endpoint.summary);
    }
    out.push_str(&format!("    {}\n", endpoint.mapping.render(&endpoint.path)));

    match endpoint.kind {
        OperationKind::Query => {
            for param in &page.query_params {
                if endpoint.path_variables.contains(&param.name) {
                    continue;
                }
                args.push(format!(
                    "@RequestParam(value = \"{}\", required = false) {} {}",
                    java_string(&param.name),
                    param.java_type,
                    param.java_name
                ));
            }
            let call_args: Vec<String> = page
                .query_params
                .iter()
                .map(|p| {
                    if endpoint.path_variables.contains(&p.name) {
                        "null".to_string()
                    } else {
                        p.java_name.clone()
                    }
                })
                .collect();
            out.push_str(&format!(
                "    public List<{dto}> {}({}) {{\n",
                endpoint.handler,
                args.join(", ")
            ));
            out.push_str(&format!(
                "        return {instance}.query({});\n",
                call_args.join(", ")
            ));
        }
        OperationKind::Add | OperationKind::Edit => {
            args.push(format!("@RequestBody {dto} dto"));
            let call = if endpoint.kind == OperationKind::Add {
                "add"
            } else {
                "edit"
            };
            out.push_str(&format!(
                "    public {dto} {}({}) {{\n",
                endpoint.handler,
                args.join(", ")
            ));
            out.push_str(&format!("        return {instance}.{call}(dto);\n"));
        }
        OperationKind::Delete | OperationKind::View => {
            let binding = if pk_in_path { "PathVariable" } else { "RequestParam" };
            args.push(format!(
                "@{binding}(\"{}\") {} {}",
                java_string(&pk.name),
                pk.java_type,
                pk.java_name
            ));
            let (returns, body) = if endpoint.kind == OperationKind::Delete {
                ("void".to_string(), format!("{instance}.delete({})", pk.java_name))
            } else {
                (dto.clone(), format!("return {instance}.view({})", pk.java_name))
            };
            out.push_str(&format!(
                "    public {returns} {}({}) {{\n",
                endpoint.handler,
                args.join(", ")
            ));
            out.push_str(&format!("        {body};\n"));
        }
    }
    out.push_str("    }\n");
}

fn query_signature(page: &PageModel) -> String {
    page.query_params
        .iter()
        .map(|p| format!("{} {}", p.java_type, p.java_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameter name for a path variable, prefixed so it never clashes with
/// query parameters or the primary key.
fn path_arg(variable: &str) -> String {
    let name = amis_contract_core::naming::upper_camel(variable);
    format!("path{name}")
}

fn push_label(out: &mut String, label: &str) {
    let label = label.replace("*/", "* /");
    out.push_str(&format!("    /** {} */\n", label.trim()));
}

fn push_fields(out: &mut String, fields: &[JavaField]) {
    for field in fields {
        push_label(out, &field.label);
        out.push_str(&format!(
            "    private {} {};\n\n",
            field.java_type, field.java_name
        ));
    }
}

fn push_accessors(out: &mut String, fields: &[JavaField]) {
    for field in fields {
        out.push_str(&format!(
            "    public {} {}() {{\n        return {};\n    }}\n\n",
            field.java_type,
            field.getter(),
            field.java_name
        ));
        out.push_str(&format!(
            "    public void {}({} {}) {{\n        this.{} = {};\n    }}\n\n",
            field.setter(),
            field.java_type,
            field.java_name,
            field.java_name,
            field.java_name
        ));
    }
}
