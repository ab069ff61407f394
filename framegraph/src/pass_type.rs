use std::ops::{Deref, DerefMut};
use crate::cull_pass_node::CullPassNode;
use crate::normal_pass_node::NormalPassNode;
use crate::pass_node::PassNode;
use crate::render_pass_node::RenderPassNode;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassKind {
    Normal,
    Render,
    Cull
}

#[derive(Debug)]
pub enum PassType {
    Normal(NormalPassNode),
    Render(RenderPassNode),
    Cull(CullPassNode)
}

impl PassType {
    pub fn get_kind(&self) -> PassKind {
        match self {
            PassType::Normal(_) => PassKind::Normal,
            PassType::Render(_) => PassKind::Render,
            PassType::Cull(_) => PassKind::Cull
        }
    }

    pub fn as_render(&self) -> Option<&RenderPassNode> {
        match self {
            PassType::Render(rn) => Some(rn),
            _ => None
        }
    }

    pub fn as_cull(&self) -> Option<&CullPassNode> {
        match self {
            PassType::Cull(cn) => Some(cn),
            _ => None
        }
    }
}

impl Deref for PassType {
    type Target = dyn PassNode;

    fn deref(&self) -> &(dyn PassNode + 'static) {
        match self {
            PassType::Normal(nn) => {
                nn
            },
            PassType::Render(rn) => {
                rn
            },
            PassType::Cull(cn) => {
                cn
            }
        }
    }
}

impl DerefMut for PassType {
    fn deref_mut(&mut self) -> &mut (dyn PassNode + 'static) {
        match self {
            PassType::Normal(nn) => {
                nn
            },
            PassType::Render(rn) => {
                rn
            },
            PassType::Cull(cn) => {
                cn
            }
        }
    }
}
