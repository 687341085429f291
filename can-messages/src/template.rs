//! Template expansion
//!
//! Structurally identical boards (six arm joints, several ModuCards) share one
//! logical protocol. Each template message is replicated once per node by
//! OR-ing the node offset into the template's frame ID. The node offset lives
//! in a reserved field that the templates must leave clear, so the two parts
//! never collide.

use crate::frame_id::BitField;
use crate::message::{max_frame_id, Message};
use crate::types::CompositionError;

/// One physical instance of a templated board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Bits OR-ed into every template frame ID
    pub offset: u32,
    /// Label used in expanded message names
    pub label: String,
}

impl Node {
    pub fn new(offset: u32, label: impl Into<String>) -> Self {
        Self {
            offset,
            label: label.into(),
        }
    }
}

/// A logical protocol shared by several nodes
#[derive(Debug, Clone)]
pub struct ProtocolTemplate {
    protocol: String,
    node_field: BitField,
    templates: Vec<Message>,
}

impl ProtocolTemplate {
    /// Create a protocol whose node offsets live in `node_field`
    ///
    /// The node field must be non-empty and end within the 29-bit ID space.
    pub fn new(
        protocol: impl Into<String>,
        node_field: BitField,
        templates: Vec<Message>,
    ) -> Result<Self, CompositionError> {
        node_field.check_range("node")?;
        Ok(Self {
            protocol: protocol.into(),
            node_field,
            templates,
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn node_field(&self) -> BitField {
        self.node_field
    }

    pub fn templates(&self) -> &[Message] {
        &self.templates
    }

    /// Expand every template for every node
    ///
    /// Yields exactly `templates.len() * nodes.len()` messages, all nodes of the
    /// first template, then all nodes of the second, and so on. Each message is
    /// an independent copy named `<protocol>_<label>_<template>`.
    pub fn expand(&self, nodes: &[Node]) -> Result<Vec<Message>, CompositionError> {
        let mask = self.node_field.mask();

        for template in &self.templates {
            if template.frame_id() & mask != 0 {
                return Err(CompositionError::ReservedBitsSet {
                    protocol: self.protocol.clone(),
                    template: template.name().to_string(),
                    frame_id: template.frame_id(),
                    mask,
                });
            }
        }

        for (idx, node) in nodes.iter().enumerate() {
            if node.offset & !mask != 0 {
                return Err(CompositionError::OffsetOutsideField {
                    protocol: self.protocol.clone(),
                    label: node.label.clone(),
                    offset: node.offset,
                    mask,
                });
            }

            if nodes[..idx]
                .iter()
                .any(|other| other.offset == node.offset || other.label == node.label)
            {
                return Err(CompositionError::DuplicateNode {
                    protocol: self.protocol.clone(),
                    label: node.label.clone(),
                    offset: node.offset,
                });
            }
        }

        let mut expanded = Vec::with_capacity(self.templates.len() * nodes.len());
        for template in &self.templates {
            for node in nodes {
                let frame_id = node.offset | template.frame_id();
                let name = format!("{}_{}_{}", self.protocol, node.label, template.name());

                if frame_id > max_frame_id(template.is_extended()) {
                    return Err(CompositionError::IdOverflow {
                        message: name,
                        frame_id,
                    });
                }

                expanded.push(template.readdressed(frame_id, name));
            }
        }

        log::debug!(
            "Expanded protocol '{}': {} templates x {} nodes = {} messages",
            self.protocol,
            self.templates.len(),
            nodes.len(),
            expanded.len()
        );

        Ok(expanded)
    }
}
