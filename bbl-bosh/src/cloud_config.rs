//! Cloud-config generation and upload
//!
//! The configurator is a pure translation of stack facts + AZ names into a
//! `CloudConfigInput`; the manager renders that input into the YAML document
//! the director consumes.

use async_trait::async_trait;
use bbl_core::CoreError;
use bbl_core::managers::{BoshClient, CloudConfigManager, CloudConfigurator};
use bbl_core::types::{CloudConfigInput, Stack};
use serde::{Deserialize, Serialize};

#[derive(Default)]
pub struct BoshCloudConfigurator;

impl BoshCloudConfigurator {
    pub fn new() -> Self {
        Self
    }
}

impl CloudConfigurator for BoshCloudConfigurator {
    fn configure(&self, stack: &Stack, azs: &[String]) -> CloudConfigInput {
        let (lb_type, lbs) = if !stack.output("ConcourseLoadBalancer").is_empty() {
            (
                "concourse".to_string(),
                vec![stack.output("ConcourseLoadBalancer").to_string()],
            )
        } else if !stack.output("CFRouterLoadBalancer").is_empty() {
            (
                "cf".to_string(),
                vec![
                    stack.output("CFRouterLoadBalancer").to_string(),
                    stack.output("CFSSHProxyLoadBalancer").to_string(),
                ],
            )
        } else {
            (String::new(), Vec::new())
        };

        CloudConfigInput {
            azs: azs.to_vec(),
            lb_type,
            lbs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CloudConfig {
    azs: Vec<AzEntry>,
    vm_types: Vec<VmType>,
    disk_types: Vec<DiskType>,
    compilation: Compilation,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    vm_extensions: Vec<VmExtension>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AzEntry {
    name: String,
    cloud_properties: AzCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AzCloudProperties {
    availability_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VmType {
    name: String,
    cloud_properties: VmTypeCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VmTypeCloudProperties {
    instance_type: String,
    ephemeral_disk: EphemeralDisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EphemeralDisk {
    size: u64,
    #[serde(rename = "type")]
    disk_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DiskType {
    name: String,
    disk_size: u64,
    cloud_properties: DiskCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DiskCloudProperties {
    #[serde(rename = "type")]
    disk_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Compilation {
    workers: u64,
    network: String,
    reuse_compilation_vms: bool,
    az: String,
    vm_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VmExtension {
    name: String,
    cloud_properties: VmExtensionCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VmExtensionCloudProperties {
    elbs: Vec<String>,
}

fn render(input: &CloudConfigInput) -> CloudConfig {
    let azs = input
        .azs
        .iter()
        .enumerate()
        .map(|(index, zone)| AzEntry {
            name: format!("z{}", index + 1),
            cloud_properties: AzCloudProperties {
                availability_zone: zone.clone(),
            },
        })
        .collect();

    let vm_extensions = if input.lbs.is_empty() {
        Vec::new()
    } else {
        vec![VmExtension {
            name: "lb".to_string(),
            cloud_properties: VmExtensionCloudProperties {
                elbs: input.lbs.clone(),
            },
        }]
    };

    CloudConfig {
        azs,
        vm_types: vec![
            VmType {
                name: "default".to_string(),
                cloud_properties: VmTypeCloudProperties {
                    instance_type: "m3.medium".to_string(),
                    ephemeral_disk: EphemeralDisk {
                        size: 10_240,
                        disk_type: "gp2".to_string(),
                    },
                },
            },
            VmType {
                name: "large".to_string(),
                cloud_properties: VmTypeCloudProperties {
                    instance_type: "m3.xlarge".to_string(),
                    ephemeral_disk: EphemeralDisk {
                        size: 30_720,
                        disk_type: "gp2".to_string(),
                    },
                },
            },
        ],
        disk_types: vec![DiskType {
            name: "default".to_string(),
            disk_size: 10_240,
            cloud_properties: DiskCloudProperties {
                disk_type: "gp2".to_string(),
            },
        }],
        compilation: Compilation {
            workers: 3,
            network: "default".to_string(),
            reuse_compilation_vms: true,
            az: "z1".to_string(),
            vm_type: "default".to_string(),
        },
        vm_extensions,
    }
}

#[derive(Default)]
pub struct BoshCloudConfigManager;

impl BoshCloudConfigManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CloudConfigManager for BoshCloudConfigManager {
    async fn update(
        &self,
        input: CloudConfigInput,
        client: &dyn BoshClient,
    ) -> Result<(), CoreError> {
        let document = render(&input);
        let yaml = serde_yaml::to_string(&document)
            .map_err(|e| CoreError::CloudConfig(format!("failed to render cloud config: {}", e)))?;

        client.update_cloud_config(&yaml).await
    }
}
