use crate::graph::{node::EffectNode, through::Through};

pub trait NodeExt: EffectNode + Sized {
    fn through<B: EffectNode>(self, next: B) -> Through<Self, B> {
        Through::new(self, next)
    }

    fn boxed(self) -> Box<dyn EffectNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: EffectNode> NodeExt for T {}
