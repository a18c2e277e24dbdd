//! DocumentRegistry contract bindings
//!
//! Only the calling convention is declared here; calls are ABI-encoded with
//! these bindings and routed through the wallet capability.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface DocumentRegistry {
        function uploadDocument(string docHash, string category, string authors, uint256 deadline) external;

        function getTotalDocuments() external view returns (uint256 total);

        function documents(uint256 id) external view returns (
            uint256 id,
            string docHash,
            address owner,
            string category,
            string authors,
            uint256 deadline,
            uint256 uploadTimestamp
        );

        function getDocumentsByOwner(address owner) external view returns (uint256[] ids);

        function getDocumentsByCategory(string category) external view returns (uint256[] ids);
    }
}
