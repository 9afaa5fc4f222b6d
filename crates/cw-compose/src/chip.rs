//! Chip assembly: runs the wiring steps and hands back the finished graph.

use cw_graph::ComponentGraph;
use cw_template::{Template, TemplateLoader};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ComposeResult;
use crate::features::ChipFeatures;
use crate::options::ComposeOptions;
use crate::steps::{ChipContext, WiringStep, chip_component, default_steps};
use crate::subsystem::{ClusterComposer, SocComposer, SubsystemComposer};

/// Top-level composer. Each call to [`compose`](Self::compose) builds a
/// fresh graph; nothing is cached between calls.
pub struct ChipComposer {
    loader: TemplateLoader,
    soc: Box<dyn SubsystemComposer>,
    cluster: Box<dyn SubsystemComposer>,
    steps: Vec<WiringStep>,
}

impl Default for ChipComposer {
    fn default() -> Self {
        Self::new(TemplateLoader::default())
    }
}

impl ChipComposer {
    pub fn new(loader: TemplateLoader) -> Self {
        Self {
            loader,
            soc: Box::new(SocComposer),
            cluster: Box::new(ClusterComposer),
            steps: default_steps(),
        }
    }

    pub fn with_soc_composer(mut self, soc: impl SubsystemComposer + 'static) -> Self {
        self.soc = Box::new(soc);
        self
    }

    pub fn with_cluster_composer(mut self, cluster: impl SubsystemComposer + 'static) -> Self {
        self.cluster = Box::new(cluster);
        self
    }

    pub fn steps(&self) -> &[WiringStep] {
        &self.steps
    }

    /// Build and validate the chip graph described by `tp`.
    pub fn compose(&self, tp: &Template) -> ComposeResult<ComponentGraph> {
        let features = ChipFeatures::from_template(tp)?;
        let options = ComposeOptions::from_template(tp)?;
        info!(
            chip = %features.chip_name,
            clusters = features.nb_cluster,
            features = ?features.enabled(),
            "composing chip"
        );

        let mut ctx = ChipContext {
            template: tp,
            features: &features,
            options: &options,
            loader: &self.loader,
            soc_composer: self.soc.as_ref(),
            cluster_composer: self.cluster.as_ref(),
            graph: ComponentGraph::new(chip_component(&features)),
        };

        for step in &self.steps {
            if step.enabled(&features) {
                debug!(step = step.name, "apply");
                (step.apply)(&mut ctx)?;
            } else {
                debug!(step = step.name, "skip");
            }
        }

        let graph = ctx.graph;
        graph.validate()?;
        info!(
            components = graph.nodes().len(),
            bindings = graph.bindings().len(),
            "chip composed"
        );
        Ok(graph)
    }

    /// Compose and render in one go.
    #[doc(alias = "get_js_config")]
    pub fn get_config(&self, tp: &Template) -> ComposeResult<Value> {
        Ok(self.compose(tp)?.render())
    }
}

/// Compose `tp` with the default subsystem composers.
pub fn get_config(tp: &Template) -> ComposeResult<Value> {
    ChipComposer::default().get_config(tp)
}
