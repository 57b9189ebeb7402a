//! Shared state for the fleet lifecycle behaviour tests.

use std::cell::RefCell;
use std::sync::Arc;

use fleet_config::{ServiceDescriptor, SidecarDescriptor};

use super::fleet::{OpenPort, closed_port, controller, crasher, sidecar, sleeper};
use super::reporter::RecordingFleetReporter;
use crate::controller::{FleetController, ServiceStartFailure};
use crate::process::ShutdownToken;
use crate::scheduler::{FleetPlan, SchedulerError};

/// Fleet under construction plus whatever the scenario observed.
#[derive(Default)]
pub struct FleetWorld {
    pub reporter: Arc<RecordingFleetReporter>,
    ports: Vec<OpenPort>,
    descriptors: Vec<ServiceDescriptor>,
    sidecar: Option<SidecarDescriptor>,
    controller: Option<FleetController>,
    start_result: Option<Result<(), ServiceStartFailure>>,
    plan_error: Option<SchedulerError>,
}

impl FleetWorld {
    fn open_port(&mut self) -> u16 {
        let open = OpenPort::bind();
        let port = open.port();
        self.ports.push(open);
        port
    }

    pub fn add_ready(&mut self, name: &str) {
        let port = self.open_port();
        self.descriptors.push(sleeper(name, port, &[]));
    }

    pub fn add_silent(&mut self, name: &str) {
        self.descriptors.push(sleeper(name, closed_port(), &[]));
    }

    pub fn add_crashing(&mut self, name: &str) {
        let port = self.open_port();
        self.descriptors.push(crasher(name, port, "0.3", 1));
    }

    pub fn add_dependency(&mut self, name: &str, dependency: &str) -> Result<(), String> {
        let descriptor = self
            .descriptors
            .iter_mut()
            .find(|descriptor| descriptor.name() == name)
            .ok_or_else(|| format!("service {name} was not declared"))?;
        let mut depends_on = descriptor.depends_on().to_vec();
        depends_on.push(dependency.to_owned());
        *descriptor = descriptor.clone().with_dependencies(depends_on);
        Ok(())
    }

    pub fn add_sidecar(&mut self, name: &str) {
        let port = self.open_port();
        self.sidecar = Some(sidecar(name, port));
    }

    pub fn plan(&mut self) {
        self.plan_error = FleetPlan::new(self.descriptors.clone()).err();
    }

    pub fn start(&mut self) {
        let mut controller = controller(
            self.descriptors.clone(),
            self.sidecar.clone(),
            &self.reporter,
        );
        self.start_result = Some(controller.start(None, &ShutdownToken::new()));
        self.controller = Some(controller);
    }

    pub fn stop(&mut self) -> Result<(), String> {
        self.controller_mut()?.stop();
        Ok(())
    }

    pub fn controller_mut(&mut self) -> Result<&mut FleetController, String> {
        self.controller
            .as_mut()
            .ok_or_else(|| "the fleet was never started".to_owned())
    }

    pub fn controller(&self) -> Result<&FleetController, String> {
        self.controller
            .as_ref()
            .ok_or_else(|| "the fleet was never started".to_owned())
    }

    pub fn start_result(&self) -> Result<&Result<(), ServiceStartFailure>, String> {
        self.start_result
            .as_ref()
            .ok_or_else(|| "the fleet was never started".to_owned())
    }

    pub fn plan_error(&self) -> Option<&SchedulerError> {
        self.plan_error.as_ref()
    }
}

/// Fixture providing a fresh fleet world.
pub fn world() -> RefCell<FleetWorld> {
    RefCell::new(FleetWorld::default())
}
