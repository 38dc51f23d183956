//! The builtin operation catalog.
//!
//! Operation names and argument names are part of the external contract and
//! must not change.

use crate::types::Method;

use super::descriptor::{ArgKind, ArgSpec, Binding, ClusterRoute, OperationDescriptor, Route};

const fn string(name: &'static str, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::String,
        required: true,
        binding: Binding::Path,
        description,
    }
}

const fn integer(name: &'static str, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        kind: ArgKind::Integer,
        required: true,
        binding: Binding::Path,
        description,
    }
}

const fn optional(arg: ArgSpec) -> ArgSpec {
    ArgSpec {
        required: false,
        ..arg
    }
}

const fn field(arg: ArgSpec) -> ArgSpec {
    ArgSpec {
        binding: Binding::Field,
        ..arg
    }
}

const NODE: ArgSpec = string("node", "Node name");
const VMID: ArgSpec = integer("vmid", "VM ID");
const CTID: ArgSpec = integer("vmid", "Container ID");
const TIMEOUT: ArgSpec = optional(field(integer("timeout", "Timeout in seconds (optional)")));

const NODE_VM: &[ArgSpec] = &[NODE, VMID];
const NODE_VM_TIMEOUT: &[ArgSpec] = &[NODE, VMID, TIMEOUT];
const NODE_CT: &[ArgSpec] = &[NODE, CTID];

const fn get(path: &'static str) -> Route {
    Route::Fixed {
        method: Method::Get,
        path,
    }
}

const fn post(path: &'static str) -> Route {
    Route::Fixed {
        method: Method::Post,
        path,
    }
}

/// Every operation, in advertisement order.
pub const CATALOG: &[OperationDescriptor] = &[
    // Nodes
    OperationDescriptor {
        name: "list_nodes",
        description: "List all nodes in the Proxmox cluster",
        args: &[],
        route: get("/nodes"),
    },
    OperationDescriptor {
        name: "get_node_status",
        description: "Get status and resource usage for a specific node",
        args: &[NODE],
        route: get("/nodes/{node}/status"),
    },
    // Virtual machines
    OperationDescriptor {
        name: "list_vms",
        description: "List all virtual machines (QEMU/KVM) on a node or cluster-wide",
        args: &[optional(string(
            "node",
            "Node name (optional, if not provided lists all VMs cluster-wide)",
        ))],
        route: Route::Scoped {
            method: Method::Get,
            node_path: "/nodes/{node}/qemu",
            cluster: ClusterRoute::FanOut { nodes: "/nodes" },
        },
    },
    OperationDescriptor {
        name: "get_vm_config",
        description: "Get configuration for a specific VM",
        args: NODE_VM,
        route: get("/nodes/{node}/qemu/{vmid}/config"),
    },
    OperationDescriptor {
        name: "get_vm_status",
        description: "Get current status of a VM",
        args: NODE_VM,
        route: get("/nodes/{node}/qemu/{vmid}/status/current"),
    },
    OperationDescriptor {
        name: "start_vm",
        description: "Start a virtual machine",
        args: NODE_VM,
        route: post("/nodes/{node}/qemu/{vmid}/status/start"),
    },
    OperationDescriptor {
        name: "stop_vm",
        description: "Stop a virtual machine (forced shutdown)",
        args: NODE_VM_TIMEOUT,
        route: post("/nodes/{node}/qemu/{vmid}/status/stop"),
    },
    OperationDescriptor {
        name: "shutdown_vm",
        description: "Gracefully shutdown a virtual machine (ACPI shutdown)",
        args: NODE_VM_TIMEOUT,
        route: post("/nodes/{node}/qemu/{vmid}/status/shutdown"),
    },
    OperationDescriptor {
        name: "reboot_vm",
        description: "Reboot a virtual machine",
        args: NODE_VM,
        route: post("/nodes/{node}/qemu/{vmid}/status/reboot"),
    },
    // Containers
    OperationDescriptor {
        name: "list_containers",
        description: "List all LXC containers on a node",
        args: &[NODE],
        route: get("/nodes/{node}/lxc"),
    },
    OperationDescriptor {
        name: "get_container_status",
        description: "Get status of an LXC container",
        args: NODE_CT,
        route: get("/nodes/{node}/lxc/{vmid}/status/current"),
    },
    OperationDescriptor {
        name: "start_container",
        description: "Start an LXC container",
        args: NODE_CT,
        route: post("/nodes/{node}/lxc/{vmid}/status/start"),
    },
    OperationDescriptor {
        name: "stop_container",
        description: "Stop an LXC container",
        args: NODE_CT,
        route: post("/nodes/{node}/lxc/{vmid}/status/stop"),
    },
    // Storage
    OperationDescriptor {
        name: "list_storage",
        description: "List all storage devices",
        args: &[optional(string(
            "node",
            "Node name (optional, omit for cluster-wide)",
        ))],
        route: Route::Scoped {
            method: Method::Get,
            node_path: "/nodes/{node}/storage",
            cluster: ClusterRoute::Path("/storage"),
        },
    },
    OperationDescriptor {
        name: "get_storage_status",
        description: "Get status of a specific storage device",
        args: &[NODE, string("storage", "Storage ID")],
        route: get("/nodes/{node}/storage/{storage}/status"),
    },
    // Tasks
    OperationDescriptor {
        name: "list_tasks",
        description: "List running and recent tasks",
        args: &[
            optional(string(
                "node",
                "Node name (optional, omit for cluster-wide)",
            )),
            optional(field(integer(
                "limit",
                "Maximum number of tasks to return (default: 50)",
            ))),
        ],
        route: Route::Scoped {
            method: Method::Get,
            node_path: "/nodes/{node}/tasks",
            cluster: ClusterRoute::Path("/cluster/tasks"),
        },
    },
    OperationDescriptor {
        name: "get_task_status",
        description: "Get status of a specific task",
        args: &[NODE, string("upid", "Task UPID")],
        route: get("/nodes/{node}/tasks/{upid}/status"),
    },
    // Snapshots
    OperationDescriptor {
        name: "create_vm_snapshot",
        description: "Create a snapshot of a VM",
        args: &[
            NODE,
            VMID,
            field(string("snapname", "Snapshot name")),
            optional(field(string(
                "description",
                "Snapshot description (optional)",
            ))),
        ],
        route: post("/nodes/{node}/qemu/{vmid}/snapshot"),
    },
    OperationDescriptor {
        name: "list_vm_snapshots",
        description: "List all snapshots of a VM",
        args: NODE_VM,
        route: get("/nodes/{node}/qemu/{vmid}/snapshot"),
    },
    OperationDescriptor {
        name: "delete_vm_snapshot",
        description: "Delete a VM snapshot",
        args: &[NODE, VMID, string("snapname", "Snapshot name")],
        route: Route::Fixed {
            method: Method::Delete,
            path: "/nodes/{node}/qemu/{vmid}/snapshot/{snapname}",
        },
    },
    // Cluster
    OperationDescriptor {
        name: "get_cluster_status",
        description: "Get overall cluster status and resources",
        args: &[],
        route: get("/cluster/resources"),
    },
];
