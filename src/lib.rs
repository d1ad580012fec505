pub mod mdp_framework {
    pub mod graphable;
    pub mod importable;
    pub mod mdp_command;
    pub mod mdp_file_handler;
    pub mod mdp_output;
}
pub mod mdp_commands {
    pub mod mdp_command_explore;
    pub mod mdp_command_info;
    pub mod mdp_command_render;
}
pub mod mdp_file_handlers {
    pub mod graphviz_dot;
    pub mod portable_document_format;
    pub mod portable_network_graphics;
    pub mod scalable_vector_graphics;
}
pub mod mdp_objects {
    pub mod example_markov_decision_processes;
    pub mod markov_decision_process;
    pub mod probability;
    pub mod tabular_markov_decision_process;
    pub mod transition_graph;
}
pub mod techniques {
    pub mod explorer;
    pub mod transition_graph_builder;
}
pub mod json;
