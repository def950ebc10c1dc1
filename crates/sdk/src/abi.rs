//! Bindings of the protocol smart contracts.
//!
//! All contracts are declared within a single [`alloy::sol!`] invocation so
//! that the EAS [`Attestation`] record is the same Rust type across EAS reads,
//! arbiter calls and obligation decoding.

use alloy::sol;

sol! {
    /// EAS attestation record.
    ///
    /// `data` carries the ABI-encoded `ObligationData` of the obligation
    /// contract that issued the attestation (the `attester`).
    #[derive(Debug, Default, PartialEq, Eq)]
    struct Attestation {
        bytes32 uid;
        bytes32 schema;
        uint64 time;
        uint64 expirationTime;
        uint64 revocationTime;
        bytes32 refUID;
        address recipient;
        address attester;
        bool revocable;
        bytes data;
    }

    /// Attestation to be made by EAS, as escrowed by
    /// `AttestationEscrowObligation`.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct AttestationRequestData {
        address recipient;
        uint64 expirationTime;
        bool revocable;
        bytes32 refUID;
        bytes data;
        uint256 value;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct AttestationRequest {
        bytes32 schema;
        AttestationRequestData data;
    }

    /// Ethereum Attestation Service.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IEAS {
        event Attested(
            address indexed recipient,
            address indexed attester,
            bytes32 uid,
            bytes32 indexed schemaUID
        );

        event Revoked(
            address indexed recipient,
            address indexed attester,
            bytes32 uid,
            bytes32 indexed schemaUID
        );

        function getAttestation(bytes32 uid) external view returns (Attestation memory);
        function isAttestationValid(bytes32 uid) external view returns (bool);
        function getSchemaRegistry() external view returns (address);
    }

    /// EAS schema registry.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ISchemaRegistry {
        struct SchemaRecord {
            bytes32 uid;
            address resolver;
            bool revocable;
            string schema;
        }

        event Registered(bytes32 indexed uid, address indexed registerer, SchemaRecord schema);

        function getSchema(bytes32 uid) external view returns (SchemaRecord memory);
        function register(string calldata schema, address resolver, bool revocable)
            external
            returns (bytes32);
    }

    /// Common interface of all arbiters, including payment obligations.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IArbiter {
        function checkObligation(
            Attestation memory obligation,
            bytes memory demand,
            bytes32 counteroffer
        ) external view returns (bool);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC721 {
        function approve(address to, uint256 tokenId) external;
        function setApprovalForAll(address operator, bool approved) external;
        function getApproved(uint256 tokenId) external view returns (address);
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function ownerOf(uint256 tokenId) external view returns (address);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC1155 {
        function setApprovalForAll(address operator, bool approved) external;
        function isApprovedForAll(address account, address operator) external view returns (bool);
        function balanceOf(address account, uint256 id) external view returns (uint256);
    }

    // Escrow obligations

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC20EscrowObligation {
        struct ObligationData {
            address arbiter;
            bytes demand;
            address token;
            uint256 amount;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bool);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC721EscrowObligation {
        struct ObligationData {
            address arbiter;
            bytes demand;
            address token;
            uint256 tokenId;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bool);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC1155EscrowObligation {
        struct ObligationData {
            address arbiter;
            bytes demand;
            address token;
            uint256 tokenId;
            uint256 amount;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bool);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface NativeTokenEscrowObligation {
        struct ObligationData {
            address arbiter;
            bytes demand;
            uint256 amount;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            payable
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bool);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    /// Escrows an attestation request, made by EAS on collection.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface AttestationEscrowObligation {
        struct ObligationData {
            address arbiter;
            bytes demand;
            AttestationRequest attestation;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bytes32);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    /// Escrows an existing attestation, validated with a new attestation
    /// referencing it on collection.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface AttestationEscrowObligation2 {
        struct ObligationData {
            address arbiter;
            bytes demand;
            bytes32 attestationUid;
        }

        event EscrowMade(bytes32 indexed escrow, address indexed buyer);
        event EscrowCollected(bytes32 indexed escrow, bytes32 indexed fulfillment, address indexed fulfiller);

        function doObligation(ObligationData calldata data, uint64 expirationTime)
            external
            returns (bytes32 uid_);
        function collectEscrow(bytes32 escrow, bytes32 fulfillment) external returns (bytes32);
        function reclaimExpired(bytes32 uid) external returns (bool);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
        function VALIDATION_SCHEMA() external view returns (bytes32);
    }

    // Payment obligations

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC20PaymentObligation {
        struct ObligationData {
            address token;
            uint256 amount;
            address payee;
        }

        event PaymentMade(bytes32 indexed payment, address indexed buyer);

        function doObligation(ObligationData calldata data) external returns (bytes32 uid_);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC721PaymentObligation {
        struct ObligationData {
            address token;
            uint256 tokenId;
            address payee;
        }

        event PaymentMade(bytes32 indexed payment, address indexed buyer);

        function doObligation(ObligationData calldata data) external returns (bytes32 uid_);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface ERC1155PaymentObligation {
        struct ObligationData {
            address token;
            uint256 tokenId;
            uint256 amount;
            address payee;
        }

        event PaymentMade(bytes32 indexed payment, address indexed buyer);

        function doObligation(ObligationData calldata data) external returns (bytes32 uid_);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface NativeTokenPaymentObligation {
        struct ObligationData {
            uint256 amount;
            address payee;
        }

        event PaymentMade(bytes32 indexed payment, address indexed buyer);

        function doObligation(ObligationData calldata data) external payable returns (bytes32 uid_);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface StringObligation {
        struct ObligationData {
            string item;
        }

        function doObligation(ObligationData calldata data, bytes32 refUID)
            external
            returns (bytes32 uid_);
        function getObligationData(bytes32 uid) external view returns (ObligationData memory);
        function ATTESTATION_SCHEMA() external view returns (bytes32);
    }

    // Arbiters

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface TrivialArbiter {
        function checkObligation(Attestation memory obligation, bytes memory demand, bytes32 counteroffer)
            external
            view
            returns (bool);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface TrustedPartyArbiter {
        struct DemandData {
            address baseArbiter;
            bytes baseDemand;
            address creator;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface TrustedOracleArbiter {
        struct DemandData {
            address oracle;
            bytes data;
        }

        event ArbitrationMade(bytes32 indexed obligation, address indexed oracle, bool decision);
        event ArbitrationRequested(bytes32 indexed obligation, address indexed oracle);

        function arbitrate(bytes32 obligation, bool decision) external;
        function requestArbitration(bytes32 obligation, address oracle) external;
        function decisions(bytes32 obligation, address oracle) external view returns (bool);
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface SpecificAttestationArbiter {
        struct DemandData {
            bytes32 uid;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IntrinsicsArbiter2 {
        struct DemandData {
            bytes32 schema;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface AnyArbiter {
        struct DemandData {
            address[] arbiters;
            bytes[] demands;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface AllArbiter {
        struct DemandData {
            address[] arbiters;
            bytes[] demands;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface RecipientArbiter {
        struct DemandData {
            address baseArbiter;
            bytes baseDemand;
            address recipient;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface AttesterArbiter {
        struct DemandData {
            address baseArbiter;
            bytes baseDemand;
            address attester;
        }
    }

    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface SchemaArbiter {
        struct DemandData {
            address baseArbiter;
            bytes baseDemand;
            bytes32 schema;
        }
    }
}
