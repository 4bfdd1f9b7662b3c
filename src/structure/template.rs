//! Pre-authored structure templates and their store

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::world::WorldAccessor;
use crate::core::{Error, Result};
use crate::math::{BlockBox, BlockPos, Mirror, Rotation};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateBlock {
    /// Position relative to the template origin
    pub pos: BlockPos,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub id: String,
    pub size: BlockPos,
    pub blocks: Vec<TemplateBlock>,
}

impl StructureTemplate {
    pub fn new(id: impl Into<String>, size: BlockPos, blocks: Vec<TemplateBlock>) -> Self {
        Self { id: id.into(), size, blocks }
    }

    /// Solid box of one state
    pub fn filled(id: impl Into<String>, size: BlockPos, state: &str) -> Self {
        let mut blocks = Vec::new();
        for y in 0..size.y {
            for z in 0..size.z {
                for x in 0..size.x {
                    blocks.push(TemplateBlock { pos: BlockPos::new(x, y, z), state: state.to_string(), nbt: None });
                }
            }
        }
        Self::new(id, size, blocks)
    }

    pub fn size(&self) -> BlockPos {
        self.size
    }

    /// Every block must lie inside `[0, size)`
    pub fn validate(&self) -> Result<()> {
        if self.size.x <= 0 || self.size.y <= 0 || self.size.z <= 0 {
            return Err(Error::config(format!("template `{}` has empty size {:?}", self.id, self.size)));
        }
        let bounds = BlockBox::from_corners(BlockPos::ZERO, self.size - BlockPos::new(1, 1, 1));
        match self.blocks.iter().find(|b| !bounds.contains(b.pos)) {
            Some(block) => Err(Error::config(format!(
                "template `{}` block at {:?} lies outside size {:?}",
                self.id, block.pos, self.size
            ))),
            None => Ok(()),
        }
    }

    /// World-space box the template covers when placed
    pub fn bounds(&self, origin: BlockPos, rotation: Rotation, mirror: Mirror) -> BlockBox {
        BlockBox::for_structure(origin, self.size, rotation, mirror)
    }

    /// Write every block; returns how many were written.
    ///
    /// Not transactional: a panic in the world adapter can leave a partial
    /// structure behind.
    pub fn place(&self, world: &mut dyn WorldAccessor, origin: BlockPos, rotation: Rotation, mirror: Mirror) -> usize {
        for block in &self.blocks {
            let pos = origin + block.pos.mirror(mirror).rotate(rotation);
            world.set_block_state(pos, &block.state, block.nbt.as_ref());
        }
        self.blocks.len()
    }
}

/// Lookup of templates by resource id
pub trait StructureStore {
    fn get(&self, id: &str) -> Option<&StructureTemplate>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// First id in `ids` that resolves
    fn first_of<'a>(&'a self, ids: &[String]) -> Option<&'a StructureTemplate> {
        ids.iter().find_map(|id| self.get(id))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, StructureTemplate>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template, returning the previous one
    pub fn insert(&mut self, template: StructureTemplate) -> Option<StructureTemplate> {
        self.templates.insert(template.id.clone(), template)
    }

    /// Parse a JSON array of templates, validating each
    pub fn from_json(json: &str) -> Result<Self> {
        let templates: Vec<StructureTemplate> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for template in templates {
            template.validate()?;
            if library.insert(template).is_some() {
                log::warn!("Duplicate structure template id replaced");
            }
        }
        log::info!("Loaded {} structure templates", library.len());
        Ok(library)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        let templates: Vec<&StructureTemplate> = self.templates.values().collect();
        Ok(serde_json::to_string_pretty(&templates)?)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl StructureStore for TemplateLibrary {
    fn get(&self, id: &str) -> Option<&StructureTemplate> {
        self.templates.get(id)
    }
}
