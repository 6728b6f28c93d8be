//! One TypeScript class per model class.

use std::collections::{HashMap, HashSet};

use xtuml_core::{Attribute, ClassDef, Document, Endpoint, EventDef, Relationship, RelationshipKind, StateModel};

use crate::error::TranslateError;
use crate::naming::{camel_case, capitalize, property};
use crate::oal::{lower, LoweringContext};
use crate::type_mapper::{TargetType, TypeMapper};

const CURRENT_STATE: &str = "Current_State";

/// A field holding the instance(s) reached over a relationship.
struct NavProp<'d> {
    name: String,
    target: &'d ClassDef,
    many: bool,
    /// Suffix of the `add`/`remove` methods of a list.
    item: String,
}

impl NavProp<'_> {
    fn ty(&self) -> String {
        if self.many {
            format!("{}[]", self.target.name)
        } else {
            format!("{} | null", self.target.name)
        }
    }
}

/// A constructor parameter.
struct Param {
    name: String,
    ty: TargetType,
    optional: bool,
}

pub(crate) struct ClassGenerator<'d, 'c> {
    by_key_letter: HashMap<&'d str, &'d ClassDef>,
    relationships: Vec<&'d Relationship>,
    mapper: &'c TypeMapper<'d>,
    ctx: &'c LoweringContext<'d>,
}

impl<'d, 'c> ClassGenerator<'d, 'c> {
    pub(crate) fn new(doc: &'d Document, mapper: &'c TypeMapper<'d>, ctx: &'c LoweringContext<'d>) -> Self {
        let mut by_key_letter = HashMap::new();
        for class in doc.classes() {
            by_key_letter.entry(class.key_letter.as_str()).or_insert(class);
        }
        ClassGenerator {
            by_key_letter,
            relationships: doc.relationships().collect(),
            mapper,
            ctx,
        }
    }

    pub(crate) fn class_by_key_letter(&self, key_letter: &str) -> Option<&'d ClassDef> {
        self.by_key_letter.get(key_letter).copied()
    }

    /// The superclass of the first generalization listing `class` as a subclass.
    fn superclass(&self, class: &ClassDef) -> Option<&'d ClassDef> {
        self.relationships
            .iter()
            .filter(|r| r.kind() == Some(RelationshipKind::Subtype))
            .filter(|r| r.has_subclass(&class.key_letter))
            .find_map(|r| r.superclass_kl().and_then(|kl| self.class_by_key_letter(kl)))
    }

    /// Superclasses nearest first; stops at a cycle.
    fn ancestors(&self, class: &ClassDef) -> Vec<&'d ClassDef> {
        let mut seen = HashSet::from([class.key_letter.as_str()]);
        let mut chain = Vec::new();
        let mut current = self.superclass(class);
        while let Some(parent) = current {
            if !seen.insert(parent.key_letter.as_str()) {
                break;
            }
            chain.push(parent);
            current = self.superclass(parent);
        }
        chain
    }

    /// Attributes declared by `class` itself, minus those an ancestor
    /// already declares.
    fn own_attributes<'a>(&self, class: &'a ClassDef) -> Vec<&'a Attribute> {
        let inherited: HashSet<&str> = self
            .ancestors(class)
            .into_iter()
            .flat_map(|c| c.attributes.iter().map(|a| a.name.as_str()))
            .collect();
        let mut seen = HashSet::new();
        class
            .attributes
            .iter()
            .filter(|a| !inherited.contains(a.name.as_str()))
            .filter(|a| seen.insert(a.name.as_str()))
            .collect()
    }

    fn attribute_type(&self, class: &ClassDef, attr: &Attribute) -> TargetType {
        if attr.name == CURRENT_STATE && class.state_model.is_some() {
            return TargetType::StateEnum(class.name.clone());
        }
        let ty = self.mapper.map(&attr.attr_type, Some(class));
        if is_optional(attr) && !matches!(ty, TargetType::Nullable(_)) {
            TargetType::Nullable(Box::new(ty))
        } else {
            ty
        }
    }

    /// Constructor parameters as `(required, optional)`. A subclass takes
    /// its superclass's parameters first, and every optional parameter
    /// goes last.
    fn constructor_params(&self, class: &ClassDef, depth: usize) -> (Vec<Param>, Vec<Param>) {
        let (mut required, mut optional) = match self.superclass(class) {
            Some(parent) if depth < self.by_key_letter.len() => {
                self.constructor_params(parent, depth + 1)
            }
            _ => (Vec::new(), Vec::new()),
        };
        for attr in self.own_attributes(class) {
            if attr.name == CURRENT_STATE && class.state_model.is_some() {
                continue;
            }
            let param = Param {
                name: attr.name.clone(),
                ty: self.mapper.map(&attr.attr_type, Some(class)),
                optional: is_optional(attr),
            };
            if param.optional {
                optional.push(param);
            } else {
                required.push(param);
            }
        }
        (required, optional)
    }

    fn nav_props(&self, class: &'d ClassDef) -> Vec<NavProp<'d>> {
        let kl = class.key_letter.as_str();
        let mut props: Vec<NavProp<'d>> = Vec::new();
        let mut push = |prop: NavProp<'d>| {
            if !props.iter().any(|p| p.name == prop.name) {
                props.push(prop);
            }
        };
        for rel in &self.relationships {
            match rel.kind() {
                Some(RelationshipKind::Simple | RelationshipKind::Composition | RelationshipKind::Aggregation) => {
                    let Some((_, far)) = sides(rel, kl) else {
                        continue;
                    };
                    if let Some(target) = self.class_by_key_letter(&far.key_letter) {
                        push(NavProp {
                            name: property(&target.name, far.is_many()),
                            target,
                            many: far.is_many(),
                            item: target.name.clone(),
                        });
                    }
                }
                Some(RelationshipKind::Associative) => {
                    let Some(assoc) = rel.association_kl().and_then(|k| self.class_by_key_letter(k)) else {
                        continue;
                    };
                    if rel.one_side_kl() == Some(kl) || rel.other_side_kl() == Some(kl) {
                        push(NavProp {
                            name: property(&assoc.name, true),
                            target: assoc,
                            many: true,
                            item: assoc.name.clone(),
                        });
                    }
                    if assoc.key_letter == kl {
                        for end in [rel.one_side_kl(), rel.other_side_kl()].into_iter().flatten() {
                            if let Some(target) = self.class_by_key_letter(end) {
                                push(NavProp {
                                    name: property(&target.name, false),
                                    target,
                                    many: false,
                                    item: target.name.clone(),
                                });
                            }
                        }
                    }
                }
                Some(RelationshipKind::Reflexive) if rel.one_side_kl() == Some(kl) => {
                    let (Some(one), Some(other)) = (&rel.one_side, &rel.other_side) else {
                        continue;
                    };
                    if one.mult.as_deref() == Some("One") {
                        let role = role(one, "parent");
                        push(NavProp {
                            name: camel_case(role),
                            target: class,
                            many: false,
                            item: capitalize(role),
                        });
                    }
                    if other.is_many() {
                        let role = role(other, "children");
                        push(NavProp {
                            name: camel_case(role),
                            target: class,
                            many: true,
                            item: capitalize(role.strip_suffix('s').unwrap_or(role)),
                        });
                    }
                }
                _ => {}
            }
        }
        props
    }

    pub(crate) fn render(&self, class: &'d ClassDef) -> Result<String, TranslateError> {
        let superclass = self.superclass(class);
        let attributes = self.own_attributes(class);
        let nav = self.nav_props(class);
        let mut members = HashSet::new();

        let mut out = String::new();
        if let Some(description) = class.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("/** {description} */\n"));
        }
        match superclass {
            Some(parent) => out.push_str(&format!("export class {} extends {} {{\n", class.name, parent.name)),
            None => out.push_str(&format!("export class {} {{\n", class.name)),
        }
        out.push_str(&format!("  static instances: {}[] = [];\n\n", class.name));

        // Fields
        for attr in &attributes {
            members.insert(attr.name.clone());
            out.push_str(&format!("  {}: {};\n", attr.name, self.attribute_type(class, attr)));
        }
        let state_field = class.state_model.is_some() && !attributes.iter().any(|a| a.name == CURRENT_STATE);
        if state_field && members.insert(CURRENT_STATE.to_string()) {
            out.push_str(&format!("  {CURRENT_STATE}: {}State;\n", class.name));
        }
        let nav: Vec<NavProp<'d>> = nav.into_iter().filter(|p| members.insert(p.name.clone())).collect();
        for prop in &nav {
            out.push_str(&format!("  {}: {};\n", prop.name, prop.ty()));
        }
        out.push('\n');

        out.push_str(&self.constructor(class, superclass, &attributes, &nav));

        // Accessors
        for attr in &attributes {
            let ty = self.attribute_type(class, attr);
            let getter = format!("get{}", capitalize(&attr.name));
            if members.insert(getter.clone()) {
                out.push_str(&format!("  {getter}(): {ty} {{\n    return this.{};\n  }}\n\n", attr.name));
            }
            let setter = format!("set{}", capitalize(&attr.name));
            if !attr.is_identifier && members.insert(setter.clone()) {
                out.push_str(&format!(
                    "  {setter}(value: {ty}): void {{\n    this.{} = value;\n  }}\n\n",
                    attr.name
                ));
            }
        }

        for prop in &nav {
            out.push_str(&navigation_methods(prop, &mut members));
        }
        out.push_str(&self.composition_delete(class, &nav, &mut members));
        out.push_str(&self.relate_methods(class, &mut members));

        if let Some(sm) = &class.state_model {
            out.push_str(&self.event_methods(class, sm, &mut members)?);
        }

        // Drop the blank line after the last member.
        if out.ends_with("\n\n") {
            out.pop();
        }
        out.push_str("}\n\n");
        Ok(out)
    }

    fn constructor(
        &self,
        class: &ClassDef,
        superclass: Option<&'d ClassDef>,
        attributes: &[&Attribute],
        nav: &[NavProp<'d>],
    ) -> String {
        let (required, optional) = self.constructor_params(class, 0);
        let mut signature: Vec<String> = required.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
        signature.extend(optional.iter().map(|p| format!("{}?: {}", p.name, p.ty)));

        let mut out = format!("  constructor({}) {{\n", signature.join(", "));
        if let Some(parent) = superclass {
            let (parent_required, parent_optional) = self.constructor_params(parent, 1);
            let args: Vec<&str> = parent_required
                .iter()
                .chain(&parent_optional)
                .map(|p| p.name.as_str())
                .collect();
            out.push_str(&format!("    super({});\n", args.join(", ")));
        }
        for attr in attributes {
            if attr.name == CURRENT_STATE && class.state_model.is_some() {
                continue;
            }
            if is_optional(attr) {
                out.push_str(&format!("    this.{0} = {0} ?? null;\n", attr.name));
            } else {
                out.push_str(&format!("    this.{0} = {0};\n", attr.name));
            }
        }
        if let Some(sm) = &class.state_model {
            let initial = initial_state(sm).map_or_else(|| "\"\"".to_string(), |s| format!("\"{s}\""));
            out.push_str(&format!("    this.{CURRENT_STATE} = {initial};\n"));
        }
        for prop in nav {
            let init = if prop.many { "[]" } else { "null" };
            out.push_str(&format!("    this.{} = {init};\n", prop.name));
        }
        out.push_str(&format!("    {}.instances.push(this);\n", class.name));
        out.push_str("  }\n\n");
        out
    }

    /// `delete()` on the owner of a composition releases its parts.
    fn composition_delete(&self, class: &ClassDef, nav: &[NavProp<'d>], members: &mut HashSet<String>) -> String {
        let owned: Vec<&NavProp<'d>> = self
            .relationships
            .iter()
            .filter(|r| r.kind() == Some(RelationshipKind::Composition))
            .filter(|r| r.one_side_kl() == Some(class.key_letter.as_str()))
            .filter_map(|r| r.other_side.as_ref())
            .filter_map(|part| nav.iter().find(|p| p.name == property(&self.part_name(part), part.is_many())))
            .collect();
        if owned.is_empty() || !members.insert("delete".to_string()) {
            return String::new();
        }
        let mut out = String::from("  delete(): void {\n");
        for prop in owned {
            let cleared = if prop.many { "[]" } else { "null" };
            out.push_str(&format!("    this.{} = {cleared};\n", prop.name));
        }
        out.push_str("  }\n\n");
        out
    }

    fn part_name(&self, part: &Endpoint) -> String {
        self.class_by_key_letter(&part.key_letter)
            .map_or_else(String::new, |c| c.name.clone())
    }

    /// `relateAcrossR<n>` links both ends of a binary relationship.
    fn relate_methods(&self, class: &ClassDef, members: &mut HashSet<String>) -> String {
        let mut out = String::new();
        for rel in &self.relationships {
            if !matches!(
                rel.kind(),
                Some(RelationshipKind::Simple | RelationshipKind::Composition | RelationshipKind::Aggregation)
            ) {
                continue;
            }
            let Some((near, far)) = sides(rel, &class.key_letter) else {
                continue;
            };
            let Some(target) = self.class_by_key_letter(&far.key_letter) else {
                continue;
            };
            let method = format!("relateAcross{}", rel.label);
            if !members.insert(method.clone()) {
                continue;
            }
            let forward = property(&target.name, far.is_many());
            let back = property(&class.name, near.is_many());
            out.push_str(&format!("  {method}(other: {}): void {{\n", target.name));
            out.push_str(&link("this", &forward, far.is_many(), "other"));
            out.push_str(&link("other", &back, near.is_many(), "this"));
            out.push_str("  }\n\n");
        }
        out
    }

    fn event_methods(
        &self,
        class: &ClassDef,
        sm: &StateModel,
        members: &mut HashSet<String>,
    ) -> Result<String, TranslateError> {
        let mut out = String::new();
        let mut labels = HashSet::new();
        for event in &sm.events {
            if !labels.insert(event.label()) {
                continue;
            }
            let transitions: Vec<(&str, &str)> = sm
                .transitions
                .iter()
                .filter(|t| t.event.as_deref() == Some(event.label()))
                .filter_map(|t| Some((t.from_state.as_deref()?, t.to_state.as_deref()?)))
                .collect();
            if transitions.is_empty() {
                continue;
            }
            let name = camel_case(event_name(event));
            if !members.insert(name.clone()) {
                continue;
            }

            let params = if event.params().is_empty() {
                String::new()
            } else {
                format!("params: {}EventParams", event.label())
            };
            out.push_str(&format!(
                "  {name}({params}): TransitionResult<{}State> {{\n",
                class.name
            ));
            out.push_str(&format!("    const from = this.{CURRENT_STATE};\n"));
            for (from, to) in transitions {
                out.push_str(&format!("    if (from === \"{from}\") {{\n"));
                out.push_str(&format!("      this.{CURRENT_STATE} = \"{to}\";\n"));
                out.push_str(&self.action(class, sm, to)?);
                out.push_str(&format!(
                    "      return {{ fired: true, from, to: this.{CURRENT_STATE} }};\n"
                ));
                out.push_str("    }\n");
            }
            out.push_str("    return { fired: false, state: from };\n");
            out.push_str("  }\n\n");
        }
        Ok(out)
    }

    /// Lowered entry action of `state`.
    fn action(&self, class: &ClassDef, sm: &StateModel, state: &str) -> Result<String, TranslateError> {
        let Some(text) = sm.state(state).and_then(|s| s.action_oal.as_deref()) else {
            return Ok(String::new());
        };
        lower(text, self.ctx).map_err(|source| {
            tracing::warn!(class = %class.name, state, error = %source, "lowering failed");
            TranslateError::Lowering {
                class: class.name.clone(),
                state: state.to_string(),
                source,
            }
        })
    }
}

fn is_optional(attr: &Attribute) -> bool {
    !attr.is_identifier && attr.is_referential()
}

fn initial_state(sm: &StateModel) -> Option<&str> {
    Some(sm.initial_state.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| sm.states.first().map(|s| s.name.as_str()))
}

fn event_name(event: &EventDef) -> &str {
    event
        .meaning
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(event.label())
}

fn role<'e>(end: &'e Endpoint, default: &'e str) -> &'e str {
    end.role.as_deref().filter(|r| !r.is_empty()).unwrap_or(default)
}

/// `(near, far)` endpoints of a binary relationship as seen from `key_letter`.
fn sides<'r>(rel: &'r Relationship, key_letter: &str) -> Option<(&'r Endpoint, &'r Endpoint)> {
    let (one, other) = (rel.one_side.as_ref()?, rel.other_side.as_ref()?);
    if one.key_letter == key_letter {
        Some((one, other))
    } else if other.key_letter == key_letter {
        Some((other, one))
    } else {
        None
    }
}

fn link(owner: &str, prop: &str, many: bool, value: &str) -> String {
    if many {
        format!("    if ({owner}.{prop}.indexOf({value}) === -1) {owner}.{prop}.push({value});\n")
    } else {
        format!("    {owner}.{prop} = {value};\n")
    }
}

fn navigation_methods(prop: &NavProp<'_>, members: &mut HashSet<String>) -> String {
    let name = &prop.name;
    let target = &prop.target.name;
    let mut out = String::new();
    let getter = format!("get{}", capitalize(name));
    if members.insert(getter.clone()) {
        out.push_str(&format!("  {getter}(): {} {{\n    return this.{name};\n  }}\n\n", prop.ty()));
    }
    if prop.many {
        let add = format!("add{}", prop.item);
        if members.insert(add.clone()) {
            out.push_str(&format!("  {add}(item: {target}): void {{\n"));
            out.push_str(&format!("    if (this.{name}.indexOf(item) === -1) {{\n"));
            out.push_str(&format!("      this.{name}.push(item);\n    }}\n  }}\n\n"));
        }
        let remove = format!("remove{}", prop.item);
        if members.insert(remove.clone()) {
            out.push_str(&format!("  {remove}(item: {target}): void {{\n"));
            out.push_str(&format!("    const index = this.{name}.indexOf(item);\n"));
            out.push_str(&format!("    if (index > -1) {{\n      this.{name}.splice(index, 1);\n    }}\n  }}\n\n"));
        }
    } else {
        let setter = format!("set{}", capitalize(name));
        if members.insert(setter.clone()) {
            out.push_str(&format!(
                "  {setter}(item: {target} | null): void {{\n    this.{name} = item;\n  }}\n\n"
            ));
        }
    }
    out
}
