//! bosh-init manifest assembly
//!
//! `ManifestBuilder::build` is a pure translation from `ManifestProperties`
//! into the director deployment document; identical properties always yield
//! a deep-equal manifest. Credentials default to the well-known values when
//! a prior deploy has not pinned them.

use std::collections::BTreeMap;
use std::sync::Arc;

use bbl_core::Logger;
use serde::{Deserialize, Serialize};

const BOSH_RELEASE_URL: &str = "https://bosh.io/d/github.com/cloudfoundry/bosh?v=255.6";
const BOSH_RELEASE_SHA1: &str = "b38020cd933c8b257b6a7747c3486c0d9bcf1c0e";
const BOSH_AWS_CPI_RELEASE_URL: &str =
    "https://bosh.io/d/github.com/cloudfoundry-incubator/bosh-aws-cpi-release?v=52";
const BOSH_AWS_CPI_RELEASE_SHA1: &str = "dc4a0cca3b33dce291e4fbeb9e9948b6a7be3324";
const STEMCELL_URL: &str =
    "https://bosh.io/d/stemcells/bosh-aws-xen-hvm-ubuntu-trusty-go_agent?v=3262.4";
const STEMCELL_SHA1: &str = "0da7af57283c6c4a8a1d9bd00dd2d6cefa42ab6e";

const DIRECTOR_STATIC_IP: &str = "10.0.0.6";

/// Facts the builder turns into a manifest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestProperties {
    pub subnet_id: String,
    pub availability_zone: String,
    pub elastic_ip: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub default_key_name: String,
    pub region: String,
    pub security_group: String,
    pub director_username: String,
    pub director_password: String,
    pub ssl_certificate: String,
    pub ssl_private_key: String,
    pub credentials: InternalCredentials,
}

/// Passwords wired through the director deployment. Empty fields fall back
/// to the well-known defaults so a first deploy and a re-deploy from the
/// same state produce the same manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InternalCredentials {
    pub mbus_password: String,
    pub nats_password: String,
    pub postgres_password: String,
    pub registry_password: String,
    pub blobstore_director_password: String,
    pub blobstore_agent_password: String,
}

impl InternalCredentials {
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();
        Self {
            mbus_password: get("mbusPassword"),
            nats_password: get("natsPassword"),
            postgres_password: get("postgresPassword"),
            registry_password: get("registryPassword"),
            blobstore_director_password: get("blobstoreDirectorPassword"),
            blobstore_agent_password: get("blobstoreAgentPassword"),
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("mbusPassword".to_string(), self.mbus_password.clone()),
            ("natsPassword".to_string(), self.nats_password.clone()),
            ("postgresPassword".to_string(), self.postgres_password.clone()),
            ("registryPassword".to_string(), self.registry_password.clone()),
            (
                "blobstoreDirectorPassword".to_string(),
                self.blobstore_director_password.clone(),
            ),
            (
                "blobstoreAgentPassword".to_string(),
                self.blobstore_agent_password.clone(),
            ),
        ])
    }

    pub(crate) fn or_defaults(&self) -> Self {
        let pick = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            mbus_password: pick(&self.mbus_password, "mbus-password"),
            nats_password: pick(&self.nats_password, "nats-password"),
            postgres_password: pick(&self.postgres_password, "postgres-password"),
            registry_password: pick(&self.registry_password, "registry-password"),
            blobstore_director_password: pick(
                &self.blobstore_director_password,
                "director-password",
            ),
            blobstore_agent_password: pick(&self.blobstore_agent_password, "agent-password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub releases: Vec<Release>,
    pub resource_pools: Vec<ResourcePool>,
    pub disk_pools: Vec<DiskPool>,
    pub networks: Vec<Network>,
    pub jobs: Vec<Job>,
    pub cloud_provider: CloudProvider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    pub url: String,
    pub sha1: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub name: String,
    pub network: String,
    pub stemcell: Stemcell,
    pub cloud_properties: ResourcePoolCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stemcell {
    pub url: String,
    pub sha1: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePoolCloudProperties {
    pub instance_type: String,
    pub ephemeral_disk: EphemeralDisk,
    pub availability_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemeralDisk {
    pub size: u64,
    #[serde(rename = "type")]
    pub disk_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPool {
    pub name: String,
    pub disk_size: u64,
    pub cloud_properties: DiskPoolCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskPoolCloudProperties {
    #[serde(rename = "type")]
    pub disk_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<Subnet>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub range: String,
    pub gateway: String,
    pub dns: Vec<String>,
    pub cloud_properties: SubnetCloudProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetCloudProperties {
    pub subnet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub instances: u64,
    pub templates: Vec<Template>,
    pub resource_pool: String,
    pub persistent_disk_pool: String,
    pub networks: Vec<JobNetwork>,
    pub properties: JobProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub release: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobNetwork {
    pub name: String,
    pub static_ips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProperties {
    pub nats: NatsProperties,
    pub postgres: Db,
    pub registry: RegistryProperties,
    pub blobstore: BlobstoreProperties,
    pub director: DirectorProperties,
    pub hm: HmProperties,
    pub aws: AwsProperties,
    pub agent: AgentProperties,
    pub ntp: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatsProperties {
    pub address: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Db {
    pub listen_address: String,
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub adapter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryProperties {
    pub address: String,
    pub host: String,
    pub db: Db,
    pub http: HttpProperties,
    pub username: String,
    pub password: String,
    pub port: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpProperties {
    pub user: String,
    pub password: String,
    pub port: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobstoreProperties {
    pub address: String,
    pub port: u64,
    pub provider: String,
    pub director: CredentialsBlock,
    pub agent: CredentialsBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsBlock {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorProperties {
    pub address: String,
    pub name: String,
    pub db: Db,
    pub cpi_job: String,
    pub max_threads: u64,
    pub user_management: UserManagement,
    pub ssl: SslProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserManagement {
    pub provider: String,
    pub local: LocalUserManagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUserManagement {
    pub users: Vec<UserProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProperties {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SslProperties {
    pub cert: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmProperties {
    pub director_account: CredentialsBlock,
    pub resurrector_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsProperties {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub default_key_name: String,
    pub default_security_groups: Vec<String>,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProperties {
    pub mbus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudProvider {
    pub template: Template,
    pub ssh_tunnel: SshTunnel,
    pub mbus: String,
    pub properties: CloudProviderProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshTunnel {
    pub host: String,
    pub port: u64,
    pub user: String,
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudProviderProperties {
    pub aws: AwsProperties,
    pub agent: AgentProperties,
    pub blobstore: LocalBlobstore,
    pub ntp: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalBlobstore {
    pub provider: String,
    pub path: String,
}

pub struct ManifestBuilder {
    logger: Arc<dyn Logger>,
}

impl ManifestBuilder {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    pub fn build(&self, properties: &ManifestProperties) -> Manifest {
        self.logger.step("generating bosh-init manifest");

        let credentials = properties.credentials.or_defaults();
        let director_username = non_empty_or(&properties.director_username, "admin");
        let director_password = non_empty_or(&properties.director_password, "admin");

        let db = Db {
            listen_address: "127.0.0.1".to_string(),
            host: "127.0.0.1".to_string(),
            user: "postgres".to_string(),
            password: credentials.postgres_password.clone(),
            database: "bosh".to_string(),
            adapter: "postgres".to_string(),
        };

        let aws = AwsProperties {
            access_key_id: properties.access_key_id.clone(),
            secret_access_key: properties.secret_access_key.clone(),
            default_key_name: properties.default_key_name.clone(),
            default_security_groups: vec![properties.security_group.clone()],
            region: properties.region.clone(),
        };

        let ntp = vec!["0.pool.ntp.org".to_string(), "1.pool.ntp.org".to_string()];

        Manifest {
            name: "bosh".to_string(),
            releases: vec![
                Release {
                    name: "bosh".to_string(),
                    url: BOSH_RELEASE_URL.to_string(),
                    sha1: BOSH_RELEASE_SHA1.to_string(),
                },
                Release {
                    name: "bosh-aws-cpi".to_string(),
                    url: BOSH_AWS_CPI_RELEASE_URL.to_string(),
                    sha1: BOSH_AWS_CPI_RELEASE_SHA1.to_string(),
                },
            ],
            resource_pools: vec![ResourcePool {
                name: "vms".to_string(),
                network: "private".to_string(),
                stemcell: Stemcell {
                    url: STEMCELL_URL.to_string(),
                    sha1: STEMCELL_SHA1.to_string(),
                },
                cloud_properties: ResourcePoolCloudProperties {
                    instance_type: "m3.xlarge".to_string(),
                    ephemeral_disk: EphemeralDisk {
                        size: 25_000,
                        disk_type: "gp2".to_string(),
                    },
                    availability_zone: properties.availability_zone.clone(),
                },
            }],
            disk_pools: vec![DiskPool {
                name: "disks".to_string(),
                disk_size: 20_000,
                cloud_properties: DiskPoolCloudProperties {
                    disk_type: "gp2".to_string(),
                },
            }],
            networks: vec![
                Network {
                    name: "private".to_string(),
                    network_type: "manual".to_string(),
                    subnets: Some(vec![Subnet {
                        range: "10.0.0.0/24".to_string(),
                        gateway: "10.0.0.1".to_string(),
                        dns: vec!["10.0.0.2".to_string()],
                        cloud_properties: SubnetCloudProperties {
                            subnet: properties.subnet_id.clone(),
                        },
                    }]),
                },
                Network {
                    name: "public".to_string(),
                    network_type: "vip".to_string(),
                    subnets: None,
                },
            ],
            jobs: vec![Job {
                name: "bosh".to_string(),
                instances: 1,
                templates: vec![
                    template("nats", "bosh"),
                    template("postgres", "bosh"),
                    template("blobstore", "bosh"),
                    template("director", "bosh"),
                    template("health_monitor", "bosh"),
                    template("registry", "bosh"),
                    template("aws_cpi", "bosh-aws-cpi"),
                ],
                resource_pool: "vms".to_string(),
                persistent_disk_pool: "disks".to_string(),
                networks: vec![
                    JobNetwork {
                        name: "private".to_string(),
                        static_ips: vec![DIRECTOR_STATIC_IP.to_string()],
                        default: Some(vec!["dns".to_string(), "gateway".to_string()]),
                    },
                    JobNetwork {
                        name: "public".to_string(),
                        static_ips: vec![properties.elastic_ip.clone()],
                        default: None,
                    },
                ],
                properties: JobProperties {
                    nats: NatsProperties {
                        address: "127.0.0.1".to_string(),
                        user: "nats".to_string(),
                        password: credentials.nats_password.clone(),
                    },
                    postgres: db.clone(),
                    registry: RegistryProperties {
                        address: DIRECTOR_STATIC_IP.to_string(),
                        host: DIRECTOR_STATIC_IP.to_string(),
                        db: db.clone(),
                        http: HttpProperties {
                            user: "admin".to_string(),
                            password: credentials.registry_password.clone(),
                            port: 25777,
                        },
                        username: "admin".to_string(),
                        password: credentials.registry_password.clone(),
                        port: 25777,
                    },
                    blobstore: BlobstoreProperties {
                        address: DIRECTOR_STATIC_IP.to_string(),
                        port: 25250,
                        provider: "dav".to_string(),
                        director: CredentialsBlock {
                            user: "director".to_string(),
                            password: credentials.blobstore_director_password.clone(),
                        },
                        agent: CredentialsBlock {
                            user: "agent".to_string(),
                            password: credentials.blobstore_agent_password.clone(),
                        },
                    },
                    director: DirectorProperties {
                        address: "127.0.0.1".to_string(),
                        name: "my-bosh".to_string(),
                        db,
                        cpi_job: "aws_cpi".to_string(),
                        max_threads: 10,
                        user_management: UserManagement {
                            provider: "local".to_string(),
                            local: LocalUserManagement {
                                users: vec![UserProperties {
                                    name: director_username.clone(),
                                    password: director_password.clone(),
                                }],
                            },
                        },
                        ssl: SslProperties {
                            cert: properties.ssl_certificate.clone(),
                            key: properties.ssl_private_key.clone(),
                        },
                    },
                    hm: HmProperties {
                        director_account: CredentialsBlock {
                            user: director_username,
                            password: director_password,
                        },
                        resurrector_enabled: true,
                    },
                    aws: aws.clone(),
                    agent: AgentProperties {
                        mbus: format!(
                            "nats://nats:{}@{}:4222",
                            credentials.nats_password, DIRECTOR_STATIC_IP
                        ),
                    },
                    ntp: ntp.clone(),
                },
            }],
            cloud_provider: CloudProvider {
                template: template("aws_cpi", "bosh-aws-cpi"),
                ssh_tunnel: SshTunnel {
                    host: properties.elastic_ip.clone(),
                    port: 22,
                    user: "vcap".to_string(),
                    private_key: "./bosh.pem".to_string(),
                },
                mbus: format!(
                    "https://mbus:{}@{}:6868",
                    credentials.mbus_password, properties.elastic_ip
                ),
                properties: CloudProviderProperties {
                    aws,
                    agent: AgentProperties {
                        mbus: format!("https://mbus:{}@0.0.0.0:6868", credentials.mbus_password),
                    },
                    blobstore: LocalBlobstore {
                        provider: "local".to_string(),
                        path: "/var/vcap/micro_bosh/data/cache".to_string(),
                    },
                    ntp,
                },
            },
        }
    }
}

fn template(name: &str, release: &str) -> Template {
    Template {
        name: name.to_string(),
        release: release.to_string(),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
