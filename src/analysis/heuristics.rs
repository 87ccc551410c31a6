//! Rules that keep an unreferenced member out of the report.
//!
//! Each rule is a pure predicate over symbol metadata. The chain evaluates
//! them in a fixed order and stops at the first one that matches.

use crate::config::{Config, EventHandlerConfig};
use crate::graph::{normalize_attribute_name, Accessibility, Symbol, SymbolKind};
use std::fmt;

/// Why an unreferenced symbol is not reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suppression {
    EntryPoint,
    PublicApi,
    TestMethod,
    WebEndpoint,
    Serialization,
    KeepMarker,
    Retained,
    EventHandler,
    Constructor,
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Suppression::EntryPoint => "entry point",
            Suppression::PublicApi => "public API",
            Suppression::TestMethod => "test method",
            Suppression::WebEndpoint => "web endpoint",
            Suppression::Serialization => "serialization member",
            Suppression::KeepMarker => "keep marker",
            Suppression::Retained => "retain pattern",
            Suppression::EventHandler => "event handler",
            Suppression::Constructor => "non-private constructor",
        };
        write!(f, "{}", reason)
    }
}

type Rule<'a> = fn(&SuppressionChain<'a>, &Symbol) -> bool;

/// Ordered suppression rules with first-match semantics
pub struct SuppressionChain<'a> {
    config: &'a Config,
    test_attributes: Vec<String>,
    endpoint_attributes: Vec<String>,
    serialization_attributes: Vec<String>,
    keep_attributes: Vec<String>,
    rules: Vec<(Suppression, Rule<'a>)>,
}

impl<'a> SuppressionChain<'a> {
    pub fn new(config: &'a Config) -> Self {
        let heuristics = &config.heuristics;
        Self {
            config,
            test_attributes: normalized(&heuristics.test_attributes),
            endpoint_attributes: normalized(&heuristics.endpoint_attributes),
            serialization_attributes: normalized(&heuristics.serialization_attributes),
            keep_attributes: normalized(&heuristics.keep_attributes),
            rules: vec![
                (Suppression::EntryPoint, Self::is_entry_point),
                (Suppression::PublicApi, Self::is_public_api),
                (Suppression::TestMethod, Self::is_test_method),
                (Suppression::WebEndpoint, Self::is_web_endpoint),
                (Suppression::Serialization, Self::is_serialization_member),
                (Suppression::KeepMarker, Self::has_keep_marker),
                (Suppression::Retained, Self::is_retained),
                (Suppression::EventHandler, Self::is_event_handler),
                (Suppression::Constructor, Self::is_kept_constructor),
            ],
        }
    }

    /// The first rule that keeps `symbol`, if any
    pub fn suppression(&self, symbol: &Symbol) -> Option<Suppression> {
        self.rules
            .iter()
            .find(|(_, rule)| rule(self, symbol))
            .map(|(suppression, _)| *suppression)
    }

    fn is_entry_point(&self, symbol: &Symbol) -> bool {
        symbol.kind == SymbolKind::Method && symbol.modifiers.is_static && symbol.name == "Main"
    }

    fn is_public_api(&self, symbol: &Symbol) -> bool {
        self.config.exclude_public_api && symbol.accessibility == Accessibility::Public
    }

    fn is_test_method(&self, symbol: &Symbol) -> bool {
        symbol.kind == SymbolKind::Method && symbol.has_attribute(&self.test_attributes)
    }

    fn is_web_endpoint(&self, symbol: &Symbol) -> bool {
        let in_controller = symbol.containing_type.as_ref().is_some_and(|t| {
            self.config
                .heuristics
                .controller_base_types
                .iter()
                .any(|base| t.derives_from(base))
        });

        in_controller
            || (symbol.kind == SymbolKind::Method && symbol.has_attribute(&self.endpoint_attributes))
    }

    fn is_serialization_member(&self, symbol: &Symbol) -> bool {
        matches!(symbol.kind, SymbolKind::Property | SymbolKind::Field)
            && symbol.has_attribute(&self.serialization_attributes)
    }

    fn has_keep_marker(&self, symbol: &Symbol) -> bool {
        symbol.has_attribute(&self.keep_attributes)
    }

    fn is_retained(&self, symbol: &Symbol) -> bool {
        !self.config.retain.is_empty()
            && self.config.should_retain(&symbol.name, &symbol.display_name())
    }

    /// Name and shape match only. A differently named handler is still
    /// reported, and an unused method that happens to match is hidden.
    fn is_event_handler(&self, symbol: &Symbol) -> bool {
        let handlers = &self.config.heuristics.event_handlers;
        if !handlers.enabled || symbol.kind != SymbolKind::Method || symbol.is_constructor() {
            return false;
        }
        if !symbol.returns_void || !has_handler_name(handlers, &symbol.name) {
            return false;
        }

        match symbol.parameters.as_slice() {
            [] => true,
            [sender, args] => {
                sender.simple_type_name().eq_ignore_ascii_case("object")
                    && args.simple_type_name().contains("EventArgs")
            }
            _ => false,
        }
    }

    /// Only private constructors may be reported
    fn is_kept_constructor(&self, symbol: &Symbol) -> bool {
        symbol.is_constructor() && symbol.accessibility != Accessibility::Private
    }
}

fn has_handler_name(handlers: &EventHandlerConfig, name: &str) -> bool {
    handlers.name_contains.iter().any(|p| name.contains(p.as_str()))
        || handlers.name_prefixes.iter().any(|p| name.starts_with(p.as_str()))
        || handlers.name_suffixes.iter().any(|s| name.ends_with(s.as_str()))
}

fn normalized(names: &[String]) -> Vec<String> {
    names.iter().map(|n| normalize_attribute_name(n)).collect()
}
